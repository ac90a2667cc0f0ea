pub mod address;
pub mod init;
pub mod secret;
pub mod version;

pub use address::Address;
pub use init::Init;
pub use secret::Secret;
pub use version::Version;
