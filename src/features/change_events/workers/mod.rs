mod change_stream_worker;

pub use change_stream_worker::ChangeStreamWorker;
