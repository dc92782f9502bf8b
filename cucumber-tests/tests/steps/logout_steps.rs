use cucumber::{given, then, when};
use cucumber_tests::features::world::{GateWorld, SECURITY_CHECK};
use http::header::SET_COOKIE;
use shibgate_core::logout::LogoutDecision;

#[given(expr = "logout handlers {string} are registered")]
fn given_handlers(world: &mut GateWorld, names: String) {
    world.handler_names = names.split(',').map(|n| n.trim().to_string()).collect();
}

#[given(expr = "the session cookie is {string}")]
fn given_session_cookie(world: &mut GateWorld, name: String) {
    world.config.logout.session_cookie = Some(name);
}

#[given(expr = "user {string} logged in via {string}")]
fn given_logged_in(world: &mut GateWorld, user: String, provider: String) {
    world.request = GateWorld::asserted_request(SECURITY_CHECK, &user, &provider, "urn:pwd");
    world.handle();
    assert!(world.context.is_authenticated(), "login failed: {:?}", world.last_error);
}

#[when(expr = "the next request asserts user {string} via {string}")]
fn when_next_request(world: &mut GateWorld, user: String, provider: String) {
    world.request = GateWorld::asserted_request("/app/home", &user, &provider, "urn:pwd");
    world.handle();
}

#[when(expr = "the next request carries no Shibboleth session")]
fn when_next_request_without_session(world: &mut GateWorld) {
    world.request = shibgate_core::request::ForwardedRequest::new("/app/home");
    world.handle();
}

#[then(expr = "the session is logged out because of {string}")]
fn then_logged_out(world: &mut GateWorld, claim: String) {
    let outcome = world.last_outcome.as_ref().expect("request should succeed");
    match &outcome.logout {
        LogoutDecision::Required(mismatch) => assert_eq!(mismatch.claim.to_string(), claim),
        LogoutDecision::NotRequired => panic!("expected a forced logout"),
    }
    assert!(world.context.authentication().is_none());
}

#[then(expr = "the session is kept")]
fn then_kept(world: &mut GateWorld) {
    let outcome = world.last_outcome.as_ref().expect("request should succeed");
    assert_eq!(outcome.logout, LogoutDecision::NotRequired);
    assert!(world.context.is_authenticated());
}

#[then(expr = "the logout handlers ran in order {string}")]
fn then_handlers_ran(world: &mut GateWorld, expected: String) {
    let expected: Vec<String> = expected.split(',').map(|n| n.trim().to_string()).collect();
    assert_eq!(world.recorded_calls(), expected);
}

#[then(expr = "no logout handler ran")]
fn then_no_handler(world: &mut GateWorld) {
    assert!(world.recorded_calls().is_empty());
}

#[then(expr = "the response deletes the {string} cookie")]
fn then_cookie_deleted(world: &mut GateWorld, name: String) {
    let header = world.response.get(SET_COOKIE).expect("Set-Cookie header");
    assert_eq!(header, format!("{}=; Path=/; Max-Age=0", name).as_str());
}
