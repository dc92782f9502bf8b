use cucumber::{given, then, when};
use cucumber_tests::features::world::{GateWorld, PROVIDER_ATTRIBUTE, SECURITY_CHECK};
use shibgate_core::prelude::*;

// ==================== BACKGROUND ====================

#[given(expr = "a bridge configured with the standard Shibboleth attributes")]
fn given_standard_bridge(world: &mut GateWorld) {
    assert!(world.config.validate().is_ok(), "default world config must be valid");
}

#[given(expr = "a user profile {string} with authority {string}")]
fn given_profile(world: &mut GateWorld, username: String, authority: String) {
    world.profiles.push(UserProfile::new(username.clone(), username).with_authority(authority));
}

#[given(expr = "the identity provider allow-list is {string}")]
fn given_provider_allow_list(world: &mut GateWorld, providers: String) {
    world.config.policy.identity_provider_allowed =
        providers.split(',').map(|p| p.trim().to_string()).collect();
}

#[given(expr = "the authentication method allow-list is {string}")]
fn given_method_allow_list(world: &mut GateWorld, methods: String) {
    world.config.policy.authentication_method_allowed =
        methods.split(',').map(|m| m.trim().to_string()).collect();
}

// ==================== REQUESTS ====================

#[given(expr = "the SP asserts user {string} via {string} with method {string}")]
fn given_assertion(world: &mut GateWorld, user: String, provider: String, method: String) {
    world.request = GateWorld::asserted_request(SECURITY_CHECK, &user, &provider, &method);
}

#[given(expr = "the auth type is {string}")]
fn given_auth_type(world: &mut GateWorld, auth_type: String) {
    world.request = world.request.clone().with_auth_type(auth_type);
}

#[given(expr = "the SP omits the {string} attribute")]
fn given_missing_attribute(world: &mut GateWorld, attribute: String) {
    world.request = world.request.clone().without_attribute(&attribute);
}

#[given(expr = "the request targets {string}")]
fn given_path(world: &mut GateWorld, path: String) {
    let provider = world.request.attribute(PROVIDER_ATTRIBUTE).unwrap_or_default().to_string();
    let user = world.request.remote_user().unwrap_or_default().to_string();
    world.request = GateWorld::asserted_request(&path, &user, &provider, "urn:pwd");
}

#[when(expr = "the request is handled")]
fn when_handled(world: &mut GateWorld) {
    world.handle();
}

// ==================== OUTCOMES ====================

#[then(expr = "the session is authenticated as {string}")]
fn then_authenticated_as(world: &mut GateWorld, name: String) {
    assert!(world.last_error.is_none(), "unexpected error: {:?}", world.last_error);
    let authentication = world.context.authentication().expect("session should be authenticated");
    assert!(authentication.is_authenticated());
    assert_eq!(authentication.name(), name);
}

#[then(expr = "the session has authority {string}")]
fn then_has_authority(world: &mut GateWorld, authority: String) {
    let token = world
        .context
        .authentication()
        .and_then(Authentication::identity_token)
        .expect("session should hold a shibboleth token");
    assert!(token.authorities().contains(&authority), "authorities: {:?}", token.authorities());
}

#[then(expr = "the session is anonymous")]
fn then_anonymous(world: &mut GateWorld) {
    assert!(world.context.authentication().is_none(), "session: {:?}", world.context);
}

#[then(expr = "no error is reported")]
fn then_no_error(world: &mut GateWorld) {
    assert!(world.last_error.is_none(), "unexpected error: {:?}", world.last_error);
}

#[then(expr = "authentication fails with {string}")]
fn then_fails_with(world: &mut GateWorld, message: String) {
    assert_eq!(world.last_error.as_deref(), Some(message.as_str()));
}
