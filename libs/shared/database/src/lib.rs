pub mod query;
pub mod supabase;

pub use query::{Changeset, Order, RestQuery};
pub use supabase::SupabaseClient;
