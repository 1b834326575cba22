mod dispatcher;

pub use dispatcher::ChangeEventDispatcher;
