//! Service layer: the broadcast dispatcher.

pub mod dispatcher;

pub use dispatcher::Dispatcher;
