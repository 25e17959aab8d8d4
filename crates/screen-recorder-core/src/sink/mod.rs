mod write_sink;

pub use write_sink::{SinkHandle, WriteSink};
