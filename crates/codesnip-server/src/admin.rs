//! The admin single-page app shell.

use codesnip_auth::{Caller, Capability, NONCE_ACTION, NonceSigner};
use codesnip_core::models::settings::ALLOWED_MODELS;
use serde::Serialize;
use tera::{Context, Tera};

pub const ADMIN_TEMPLATE: &str = "admin.html";

/// Path prefix the page's script posts RPC calls to.
pub const RPC_BASE: &str = "/rpc";

#[derive(Serialize)]
struct AdminPage<'a> {
    rpc_base: &'a str,
    nonce: String,
    user: &'a str,
    can_manage: bool,
    models: &'a [&'a str],
    version: &'a str,
}

/// Templates compiled into the binary.
pub fn templates() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_template(ADMIN_TEMPLATE, include_str!("../templates/admin.html"))?;
    Ok(tera)
}

/// Render the admin page for `caller` with a freshly issued token.
pub fn render_admin(
    tera: &Tera,
    nonces: &NonceSigner,
    caller: &Caller,
) -> Result<String, tera::Error> {
    let page = AdminPage {
        rpc_base: RPC_BASE,
        nonce: nonces.issue(NONCE_ACTION, &caller.user),
        user: &caller.user,
        can_manage: caller.can(Capability::ManageOptions),
        models: ALLOWED_MODELS,
        version: env!("CARGO_PKG_VERSION"),
    };
    tera.render(ADMIN_TEMPLATE, &Context::from_serialize(&page)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_carries_token_and_capability_flag() {
        let tera = templates().unwrap();
        let nonces = NonceSigner::new("secret").unwrap();
        let caller = Caller::new("ed<itor>", vec![]);

        let html = render_admin(&tera, &nonces, &caller).unwrap();

        let token = nonces.issue(NONCE_ACTION, "ed<itor>");
        assert!(html.contains(&format!(r#"data-nonce="{token}""#)));
        assert!(html.contains(r#"data-can-manage="false""#));
        assert!(html.contains(r#"data-rpc-base="/rpc""#));
        // Autoescaped.
        assert!(html.contains("ed&lt;itor&gt;"));
        assert!(!html.contains("ed<itor>"));
    }

    #[test]
    fn settings_view_lists_models_for_managers() {
        let tera = templates().unwrap();
        let nonces = NonceSigner::new("secret").unwrap();
        let caller = Caller::new("admin", vec![Capability::ManageOptions]);

        let html = render_admin(&tera, &nonces, &caller).unwrap();

        assert!(html.contains(r#"data-can-manage="true""#));
        assert!(html.contains(r#"<option value="gpt-4.1-nano">"#));
    }
}
