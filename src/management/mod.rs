mod credentials;
mod file;
mod store;
mod table;

pub use credentials::Auth;
pub use credentials::Credential;
pub use credentials::CredentialRecord;
pub use credentials::NEVER_EXPIRES;
pub use credentials::Provider;
pub use file::FileTable;
pub use store::CredentialStore;
pub use table::Condition;
pub use table::Item;
pub use table::MemoryTable;
pub use table::Records;
pub use table::Table;
