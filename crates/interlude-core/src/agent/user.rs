//! User resolution from request metadata.

use std::future::Future;
use std::pin::Pin;

use interlude_types::agent::{RequestContext, User};
use interlude_types::config::UserResolverConfig;

/// Maps an incoming request to a [`User`]. Resolution never fails: an
/// anonymous request resolves to a guest.
pub trait UserResolver: Send + Sync {
    fn resolve_user(&self, ctx: &RequestContext) -> impl Future<Output = User> + Send;
}

/// Object-safe version of [`UserResolver`].
pub trait UserResolverDyn: Send + Sync {
    fn resolve_user_boxed<'a>(
        &'a self,
        ctx: &'a RequestContext,
    ) -> Pin<Box<dyn Future<Output = User> + Send + 'a>>;
}

impl<T: UserResolver> UserResolverDyn for T {
    fn resolve_user_boxed<'a>(
        &'a self,
        ctx: &'a RequestContext,
    ) -> Pin<Box<dyn Future<Output = User> + Send + 'a>> {
        Box::pin(self.resolve_user(ctx))
    }
}

pub struct BoxUserResolver {
    inner: Box<dyn UserResolverDyn + Send + Sync>,
}

impl BoxUserResolver {
    pub fn new<T: UserResolver + 'static>(resolver: T) -> Self {
        Self {
            inner: Box::new(resolver),
        }
    }

    pub async fn resolve_user(&self, ctx: &RequestContext) -> User {
        self.inner.resolve_user_boxed(ctx).await
    }
}

/// Identifies users by an email cookie.
///
/// A missing or blank cookie resolves to the configured default email.
/// Emails listed in `admin_emails` (compared case-insensitively) join the
/// admin group; everyone else joins the user group.
#[derive(Debug, Clone)]
pub struct CookieUserResolver {
    config: UserResolverConfig,
}

impl CookieUserResolver {
    pub fn new(config: UserResolverConfig) -> Self {
        Self { config }
    }

    pub fn cookie_name(&self) -> &str {
        &self.config.cookie_name
    }
}

impl Default for CookieUserResolver {
    fn default() -> Self {
        Self::new(UserResolverConfig::default())
    }
}

impl UserResolver for CookieUserResolver {
    async fn resolve_user(&self, ctx: &RequestContext) -> User {
        let email = ctx
            .get_cookie(&self.config.cookie_name)
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .unwrap_or(self.config.default_email.as_str())
            .to_string();
        let is_admin = self
            .config
            .admin_emails
            .iter()
            .any(|a| a.eq_ignore_ascii_case(&email));
        let group = if is_admin {
            &self.config.admin_group
        } else {
            &self.config.user_group
        };
        tracing::debug!(email = %email, group = %group, "user resolved");
        User {
            id: email.clone(),
            email,
            group_memberships: vec![group.clone()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_cookie_is_guest_user() {
        let resolver = CookieUserResolver::default();
        let user = resolver.resolve_user(&RequestContext::default()).await;
        assert_eq!(user.email, "guest@example.com");
        assert_eq!(user.id, user.email);
        assert_eq!(user.group_memberships, vec!["user".to_string()]);
    }

    #[tokio::test]
    async fn test_admin_email_gets_admin_group() {
        let resolver = CookieUserResolver::default();
        let ctx = RequestContext::from_cookie_header("vanna_email=admin@example.com");
        let user = resolver.resolve_user(&ctx).await;
        assert!(user.is_member_of("admin"));
        assert!(!user.is_member_of("user"));
    }

    #[tokio::test]
    async fn test_other_email_gets_user_group() {
        let resolver = BoxUserResolver::new(CookieUserResolver::default());
        let ctx = RequestContext::default().with_cookie("vanna_email", "ann@corp.io");
        let user = resolver.resolve_user(&ctx).await;
        assert_eq!(user.email, "ann@corp.io");
        assert_eq!(user.group_memberships, vec!["user".to_string()]);
    }

    #[tokio::test]
    async fn test_blank_cookie_falls_back_to_default() {
        let resolver = CookieUserResolver::default();
        let ctx = RequestContext::default().with_cookie("vanna_email", "  ");
        assert_eq!(resolver.resolve_user(&ctx).await.email, "guest@example.com");
    }

    #[tokio::test]
    async fn test_custom_cookie_and_groups() {
        let resolver = CookieUserResolver::new(UserResolverConfig {
            cookie_name: "who".to_string(),
            admin_emails: vec!["Root@Corp.io".to_string()],
            admin_group: "ops".to_string(),
            ..UserResolverConfig::default()
        });
        let ctx = RequestContext::default().with_cookie("who", "root@corp.io");
        assert!(resolver.resolve_user(&ctx).await.is_member_of("ops"));
    }
}
