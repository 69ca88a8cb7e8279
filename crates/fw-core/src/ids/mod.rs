//! ID type wrappers for type safety.

mod id_macro;

use id_macro::define_ids;

define_ids!(
    /// Stable user identifier issued by the auth gateway.
    UserId,
    TransactionId,
    AccountId,
);
