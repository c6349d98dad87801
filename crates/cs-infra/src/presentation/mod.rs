mod json_snapshot_sink;

pub use json_snapshot_sink::JsonSnapshotSink;
