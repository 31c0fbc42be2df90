pub mod init;
pub mod publish;

pub use init::init;
pub use publish::publish;
