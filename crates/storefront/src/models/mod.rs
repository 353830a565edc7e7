//! Domain records for the storefront client.
//!
//! Everything the remote service or local storage hands us is deserialized
//! into one of these typed records at the boundary; nothing downstream works
//! on raw JSON.

pub mod cart;
pub mod history;
pub mod preferences;
pub mod product;
pub mod profile;
pub mod session;
pub mod wishlist;

pub use cart::CartLine;
pub use history::{RecentProductEntry, SearchHistoryEntry};
pub use preferences::{PreferenceUpdate, Preferences};
pub use product::ProductSummary;
pub use profile::{Profile, SignUpRequest};
pub use session::{Session, SessionUser};
pub use wishlist::WishlistEntry;
