//! HTTP execution core.
//!
//! Issues one step's request, walks its redirect chain (or stops at the first
//! response), runs the attached validators against the terminal response and
//! returns its status, headers and body.

mod context;
mod redirects;
mod request;

pub use context::ProbeContext;

#[cfg(test)]
pub(crate) use context::context_with_target;

use log::{debug, trace};

use crate::error_handling::ProbeError;
use crate::models::{FetchedResponse, Step};
use crate::validate::ResponseValidator;

/// Executes a step against the shared context.
///
/// With `follow_redirects` set, any response carrying a `Location` header is
/// followed with a GET until a response without one arrives, up to the
/// context's hop limit. Otherwise the first response is terminal, including a
/// redirect, so the caller can inspect its `Location` header.
///
/// Validators run in order against the terminal response only; the first
/// failure aborts with the response body attached.
///
/// # Errors
///
/// - `ProbeError::MissingUrl` / `InvalidUrl` if a target cannot be parsed
/// - `ProbeError::Transport` on network or IO failure, naming the URL
/// - `ProbeError::TooManyRedirects` if the chain exceeds the hop limit
/// - `ProbeError::Validation` if a validator rejects the terminal response
pub async fn execute(
    ctx: &mut ProbeContext,
    resolver: &str,
    step: &Step,
    follow_redirects: bool,
    validators: &[ResponseValidator],
) -> Result<FetchedResponse, ProbeError> {
    let mut current = step.clone();
    let mut hops = 0;
    loop {
        let response = send(ctx, resolver, &current).await?;
        if follow_redirects {
            if let Some(next) = redirects::next_hop(ctx, resolver, &response)? {
                if hops == ctx.max_redirects() {
                    return Err(ProbeError::TooManyRedirects {
                        resolver: resolver.to_string(),
                        url: next.url.unwrap_or_default(),
                        max_hops: ctx.max_redirects(),
                    });
                }
                trace!("Following redirect automatically");
                hops += 1;
                current = next;
                continue;
            }
        }
        validate_response(validators, &response)?;
        trace!("Full contents of the response {}", response.body);
        return Ok(response);
    }
}

/// Runs validators in attachment order; the first failure wins.
fn validate_response(
    validators: &[ResponseValidator],
    response: &FetchedResponse,
) -> Result<(), ProbeError> {
    for validator in validators {
        if let Err(mut e) = validator.validate(response) {
            if e.body.is_none() {
                e.body = Some(response.body.clone());
            }
            return Err(e.into());
        }
    }
    Ok(())
}

/// Sends one request and reads the whole response.
async fn send(
    ctx: &mut ProbeContext,
    resolver: &str,
    step: &Step,
) -> Result<FetchedResponse, ProbeError> {
    let target = request::target_url(resolver, step)?;
    let builder = request::build_request(ctx.client(), target.clone(), step);
    debug!("Successfully built a request to URI {}", target);
    ctx.set_last_target(target.clone());

    let transport = |source: reqwest::Error| {
        log::error!("Could not perform a http request to {}: {}", target, source);
        ProbeError::Transport {
            resolver: resolver.to_string(),
            url: target.to_string(),
            source,
        }
    };

    let response = builder.send().await.map_err(&transport)?;
    let status = response.status().as_u16();
    let headers: Vec<(String, String)> = response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).to_string(),
            )
        })
        .collect();
    if log::log_enabled!(log::Level::Trace) {
        for (name, value) in &headers {
            trace!("Header: {} = {}", name, value);
        }
    }
    let body = response.text().await.map_err(&transport)?;

    Ok(FetchedResponse {
        status,
        headers,
        body,
    })
}
