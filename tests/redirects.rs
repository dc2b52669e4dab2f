//! Redirect handling of the HTTP execution core.

mod helpers;

use helpers::{probe_context, start_federation_server};
use sso_probe::fetch::execute;
use sso_probe::initialization::init_probe_context;
use sso_probe::resolve::{AddParameters, FormPostTarget, Resolver, ResolverKind};
use sso_probe::validate::ResponseValidator;
use sso_probe::{Config, ProbeError, Step};

#[tokio::test]
async fn test_chain_followed_with_cookies() {
    let server = start_federation_server().await;
    let mut ctx = probe_context();

    let response = execute(&mut ctx, "chain", &Step::new(server.url("/chain/5")), true, &[])
        .await
        .expect("chain should resolve");

    assert_eq!(response.status, 200);
    assert_eq!(response.body, "cookies: hop1,hop2,hop3,hop4,hop5");
    assert_eq!(
        ctx.last_target().map(|u| u.path().to_string()),
        Some("/chain/0".to_string())
    );
}

#[tokio::test]
async fn test_following_matches_direct_request() {
    let server = start_federation_server().await;
    let mut followed_ctx = probe_context();
    let followed = execute(
        &mut followed_ctx,
        "chain",
        &Step::new(server.url("/chain/3")),
        true,
        &[],
    )
    .await
    .expect("chain should resolve");

    let mut direct_ctx = probe_context();
    let final_url = reqwest::Url::parse(&server.url("/chain/0")).expect("valid url");
    for hop in 1..=3 {
        direct_ctx
            .cookies()
            .add_cookie_str(&format!("hop{hop}=1; Path=/"), &final_url);
    }
    let direct = execute(
        &mut direct_ctx,
        "direct",
        &Step::new(server.url("/chain/0")),
        true,
        &[],
    )
    .await
    .expect("direct request should succeed");

    assert_eq!(followed.status, direct.status);
    assert_eq!(followed.body, direct.body);
    let without_date = |headers: &[(String, String)]| {
        headers
            .iter()
            .filter(|(name, _)| name != "date")
            .cloned()
            .collect::<Vec<_>>()
    };
    assert_eq!(without_date(&followed.headers), without_date(&direct.headers));
}

#[tokio::test]
async fn test_redirect_limit() {
    let server = start_federation_server().await;
    let mut ctx = probe_context();

    let err = execute(&mut ctx, "chain", &Step::new(server.url("/chain/20")), true, &[])
        .await
        .unwrap_err();

    assert!(matches!(err, ProbeError::TooManyRedirects { max_hops: 10, .. }));
    assert!(err
        .to_string()
        .starts_with("chain: Redirect limit of 10 exceeded at"));
}

#[tokio::test]
async fn test_redirect_cycle_terminates() {
    let server = start_federation_server().await;
    let mut ctx = probe_context();

    let err = execute(&mut ctx, "loop", &Step::new(server.url("/loop")), true, &[])
        .await
        .unwrap_err();

    assert!(matches!(err, ProbeError::TooManyRedirects { .. }));
}

#[tokio::test]
async fn test_configured_hop_limit() {
    let server = start_federation_server().await;
    let config = Config {
        max_redirects: 3,
        ..Default::default()
    };

    let mut ctx = init_probe_context(&config).expect("Failed to build context");
    assert!(execute(&mut ctx, "chain", &Step::new(server.url("/chain/3")), true, &[])
        .await
        .is_ok());

    let mut ctx = init_probe_context(&config).expect("Failed to build context");
    let err = execute(&mut ctx, "chain", &Step::new(server.url("/chain/4")), true, &[])
        .await
        .unwrap_err();
    assert!(matches!(err, ProbeError::TooManyRedirects { max_hops: 3, .. }));
}

#[tokio::test]
async fn test_unfollowed_redirect_becomes_next_step() {
    let server = start_federation_server().await;
    let resolver = Resolver::new(
        "sp",
        ResolverKind::FormPostTarget(FormPostTarget::new(vec!["execution".to_string()])),
    )
    .expect("valid resolver")
    .with_follow_redirects(false)
    .with_validator(ResponseValidator::status_code(307));
    let mut ctx = probe_context();

    let next = resolver
        .resolve(&mut ctx, Step::new(server.url("/sp/secure")))
        .await
        .expect("redirect should be handed on");

    assert_eq!(next.url, Some(server.url("/idp/login")));
    assert!(next.parameters.is_empty());
}

#[tokio::test]
async fn test_validators_see_unfollowed_redirect() {
    let server = start_federation_server().await;
    let resolver = Resolver::new("sp", ResolverKind::AddParameters(AddParameters::default()))
        .expect("valid resolver")
        .with_follow_redirects(false)
        .with_validator(ResponseValidator::status_code(200));
    let mut ctx = probe_context();

    let err = resolver
        .resolve(&mut ctx, Step::new(server.url("/chain/1")))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Invalid status code! Got 307, expected 200");
}

#[tokio::test]
async fn test_add_parameters_hands_on_unfollowed_location() {
    let server = start_federation_server().await;
    let resolver = Resolver::new("sp", ResolverKind::AddParameters(AddParameters::default()))
        .expect("valid resolver")
        .with_follow_redirects(false);
    let mut ctx = probe_context();

    let next = resolver
        .resolve(&mut ctx, Step::new(server.url("/chain/2")))
        .await
        .expect("redirect should be handed on");

    assert_eq!(next.url, Some(server.url("/chain/1")));
}
