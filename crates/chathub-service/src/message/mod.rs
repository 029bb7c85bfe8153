//! Message persistence shared by REST and the real-time broker.

pub mod service;

pub use service::MessageService;
