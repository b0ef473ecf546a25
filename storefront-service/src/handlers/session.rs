use axum::Extension;

use crate::{middleware::Claims, responses::Envelope};

/// `POST /admin/logout`
///
/// Identity tokens are stateless; the console drops its token and nothing is revoked here.
pub async fn logout(Extension(claims): Extension<Claims>) -> Envelope<()> {
    tracing::info!(subject = %claims.sub, "Admin logged out");
    Envelope::message("Logout successful")
}
