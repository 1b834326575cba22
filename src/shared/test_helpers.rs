#[cfg(test)]
use crate::features::auth::model::AuthenticatedUser;

#[cfg(test)]
use axum::{extract::Request, middleware::Next, Router};

#[cfg(test)]
pub const TEST_OWNER_ID: &str = "auth0|test-owner";

#[cfg(test)]
pub fn create_test_user(sub: &str) -> AuthenticatedUser {
    AuthenticatedUser {
        sub: sub.to_string(),
    }
}

/// Attach a fixed caller identity to every request, standing in for the
/// token authorizer in handler tests
#[cfg(test)]
pub fn with_authenticated_user(router: Router, sub: &str) -> Router {
    let user = create_test_user(sub);
    router.layer(axum::middleware::from_fn(
        move |mut request: Request, next: Next| {
            let user = user.clone();
            async move {
                request.extensions_mut().insert(user);
                next.run(request).await
            }
        },
    ))
}
