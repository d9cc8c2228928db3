pub mod ens;

pub use ens::{is_ens_name, resolve_ens_name, resolve_wallet};
