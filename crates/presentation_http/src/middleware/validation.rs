//! Request parameter validation
//!
//! A [`ParamDescriptor`] names one query or path parameter, whether it is
//! required, and an ordered list of [`Rule`]s. Descriptors are grouped into a
//! [`ParamSet`] per route and checked by [`validate_params`] before the
//! handler runs. The first failing parameter produces a 400 [`ServiceError`].
//!
//! ```ignore
//! static PARAMS: LazyLock<ParamSet> = LazyLock::new(|| {
//!     ParamSet::new([
//!         ParamDescriptor::query("days").rule(Rule::range(1.0, 9.0)),
//!     ])
//! });
//!
//! get(handler).route_layer(middleware::from_fn_with_state(&*PARAMS, validate_params))
//! ```

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Query, RawPathParams, Request, State},
    middleware::Next,
    response::Response,
};
use domain::ServiceError;
use futures::FutureExt;
use futures::future::BoxFuture;
use regex::Regex;
use tracing::debug;

use crate::error::ApiError;

/// Where a parameter is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLocation {
    /// `?name=value`
    Query,
    /// `/{name}` route segment
    Path,
}

impl fmt::Display for ParamLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query => write!(f, "query"),
            Self::Path => write!(f, "path"),
        }
    }
}

type Predicate = Arc<dyn Fn(String) -> BoxFuture<'static, bool> + Send + Sync>;

#[derive(Clone)]
enum RuleKind {
    Range { min: f64, max: f64 },
    Pattern(Regex),
    Custom(Predicate),
}

/// A check applied to a present parameter value
#[derive(Clone)]
pub struct Rule {
    kind: RuleKind,
    message: Option<String>,
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            RuleKind::Range { min, max } => format!("Range({min}..={max})"),
            RuleKind::Pattern(re) => format!("Regex({})", re.as_str()),
            RuleKind::Custom(_) => "Custom".to_string(),
        };
        f.debug_struct("Rule")
            .field("kind", &kind)
            .field("message", &self.message)
            .finish()
    }
}

impl Rule {
    /// Numeric value within `min..=max`
    #[must_use]
    pub const fn range(min: f64, max: f64) -> Self {
        Self {
            kind: RuleKind::Range { min, max },
            message: None,
        }
    }

    /// Trimmed value fully matching `pattern`
    ///
    /// # Errors
    ///
    /// Returns an error if `pattern` does not compile.
    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        let anchored = Regex::new(&format!("^(?:{pattern})$"))?;
        Ok(Self {
            kind: RuleKind::Pattern(anchored),
            message: None,
        })
    }

    /// Arbitrary predicate over the raw value; may suspend
    pub fn custom<F, Fut>(predicate: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        Self {
            kind: RuleKind::Custom(Arc::new(move |value| predicate(value).boxed())),
            message: None,
        }
    }

    /// Replace the default failure message
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    async fn check(&self, value: &str) -> bool {
        match &self.kind {
            RuleKind::Range { min, max } => value
                .trim()
                .parse::<f64>()
                .is_ok_and(|n| (*min..=*max).contains(&n)),
            RuleKind::Pattern(re) => re.is_match(value.trim()),
            RuleKind::Custom(predicate) => predicate(value.to_string()).await,
        }
    }

    fn failure_message(&self, name: &str) -> String {
        if let Some(message) = &self.message {
            return message.clone();
        }
        match &self.kind {
            RuleKind::Range { min, max } => {
                format!("Parameter {name} is out of range ({min} to {max})")
            },
            RuleKind::Pattern(_) => format!("Invalid {name}"),
            RuleKind::Custom(_) => format!("Parameter {name} is invalid"),
        }
    }
}

/// One validated parameter
#[derive(Debug, Clone)]
pub struct ParamDescriptor {
    name: &'static str,
    location: ParamLocation,
    required: bool,
    rules: Vec<Rule>,
}

impl ParamDescriptor {
    /// Optional query parameter without rules
    #[must_use]
    pub const fn query(name: &'static str) -> Self {
        Self {
            name,
            location: ParamLocation::Query,
            required: false,
            rules: Vec::new(),
        }
    }

    /// Required path parameter without rules
    #[must_use]
    pub const fn path(name: &'static str) -> Self {
        Self {
            name,
            location: ParamLocation::Path,
            required: true,
            rules: Vec::new(),
        }
    }

    /// Mark the parameter as required
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Append a rule; rules run in the order added
    #[must_use]
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Parameter name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Parameter location
    #[must_use]
    pub const fn location(&self) -> ParamLocation {
        self.location
    }

    /// Validate one value
    ///
    /// Absent and blank values are treated alike: an error when required,
    /// otherwise a pass without running any rule.
    pub async fn validate(&self, value: Option<&str>) -> Result<(), ServiceError> {
        let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
            if self.required {
                return Err(ServiceError::bad_request(format!(
                    "Missing required {} parameter: {}",
                    self.location, self.name
                )));
            }
            return Ok(());
        };

        for rule in &self.rules {
            if !rule.check(value).await {
                return Err(ServiceError::bad_request(rule.failure_message(self.name)));
            }
        }
        Ok(())
    }
}

/// The descriptors checked for one route
#[derive(Debug, Clone, Default)]
pub struct ParamSet {
    params: Vec<ParamDescriptor>,
}

impl ParamSet {
    /// Group descriptors; they are checked in this order
    pub fn new(params: impl IntoIterator<Item = ParamDescriptor>) -> Self {
        Self {
            params: params.into_iter().collect(),
        }
    }

    /// Descriptors in check order
    #[must_use]
    pub fn params(&self) -> &[ParamDescriptor] {
        &self.params
    }

    /// Validate every descriptor against the request's parameters
    pub async fn validate(
        &self,
        query: &HashMap<String, String>,
        path: &HashMap<String, String>,
    ) -> Result<(), ServiceError> {
        for param in &self.params {
            let source = match param.location {
                ParamLocation::Query => query,
                ParamLocation::Path => path,
            };
            param
                .validate(source.get(param.name).map(String::as_str))
                .await?;
        }
        Ok(())
    }
}

/// Middleware running a [`ParamSet`] before the handler
pub async fn validate_params(
    State(params): State<&'static ParamSet>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (mut parts, body) = request.into_parts();

    let query = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
        .map(|Query(q)| q)
        .map_err(|e| ServiceError::bad_request("Malformed query string").with_cause(e))?;

    let path: HashMap<String, String> = match RawPathParams::from_request_parts(&mut parts, &()).await {
        Ok(raw) => raw
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        Err(_) => HashMap::new(),
    };

    if let Err(err) = params.validate(&query, &path).await {
        debug!(path = %parts.uri.path(), error = %err, "Parameter validation failed");
        return Err(err.into());
    }

    Ok(next.run(Request::from_parts(parts, body)).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[tokio::test]
    async fn required_param_missing_or_blank() {
        let lat = ParamDescriptor::query("lat").required();

        let err = lat.validate(None).await.unwrap_err();
        assert_eq!(err.status(), 400);
        assert_eq!(err.message(), "Missing required query parameter: lat");

        let err = lat.validate(Some("   ")).await.unwrap_err();
        assert!(err.message().contains("lat"));
    }

    #[tokio::test]
    async fn missing_path_param_names_location() {
        let err = ParamDescriptor::path("stationId")
            .validate(None)
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Missing required path parameter: stationId");
    }

    #[tokio::test]
    async fn optional_absent_param_skips_rules() {
        // A rule that always fails proves it was never evaluated
        let days = ParamDescriptor::query("days").rule(Rule::custom(|_| async { false }));
        assert!(days.validate(None).await.is_ok());
        assert!(days.validate(Some("")).await.is_ok());
    }

    #[tokio::test]
    async fn range_bounds_are_inclusive() {
        let count = ParamDescriptor::query("count").rule(Rule::range(1.0, 100.0));

        assert!(count.validate(Some("1")).await.is_ok());
        assert!(count.validate(Some("100")).await.is_ok());
        assert!(count.validate(Some(" 50 ")).await.is_ok());

        for bad in ["0", "101", "abc", "NaN", "-inf"] {
            let err = count.validate(Some(bad)).await.unwrap_err();
            assert_eq!(err.status(), 400);
            assert!(err.message().contains("out of range"), "{bad}: {}", err.message());
        }
    }

    #[tokio::test]
    async fn regex_must_match_fully() {
        let country = ParamDescriptor::query("country").rule(Rule::regex("[A-Za-z]{2}").unwrap());

        assert!(country.validate(Some("US")).await.is_ok());
        assert!(country.validate(Some(" de ")).await.is_ok());

        for bad in ["USA", "U", "U1"] {
            let err = country.validate(Some(bad)).await.unwrap_err();
            assert!(err.message().contains("Invalid"));
        }
    }

    #[tokio::test]
    async fn custom_rule_may_suspend() {
        let token = ParamDescriptor::query("token").required().rule(Rule::custom(|value| async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            value == "valid"
        }));

        assert!(token.validate(Some("valid")).await.is_ok());

        let err = token.validate(Some("nope")).await.unwrap_err();
        assert!(err.message().contains("invalid"));

        let err = token.validate(None).await.unwrap_err();
        assert!(err.message().contains("required"));
    }

    #[tokio::test]
    async fn first_failing_rule_message_wins() {
        let hours = ParamDescriptor::query("hours")
            .rule(Rule::regex(r"\d+").unwrap().with_message("Invalid hours: digits only"))
            .rule(Rule::range(1.0, 48.0).with_message("hours out of range"));

        let err = hours.validate(Some("4.5")).await.unwrap_err();
        assert_eq!(err.message(), "Invalid hours: digits only");

        let err = hours.validate(Some("49")).await.unwrap_err();
        assert_eq!(err.message(), "hours out of range");
    }

    #[tokio::test]
    async fn param_set_checks_in_order() {
        let set = ParamSet::new([
            ParamDescriptor::query("lat").required().rule(Rule::range(-90.0, 90.0)),
            ParamDescriptor::query("lon").required().rule(Rule::range(-180.0, 180.0)),
        ]);

        let err = set
            .validate(&query(&[("lat", "100")]), &HashMap::new())
            .await
            .unwrap_err();
        assert!(err.message().contains("lat"));

        let err = set
            .validate(&query(&[("lat", "10")]), &HashMap::new())
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Missing required query parameter: lon");

        assert!(
            set.validate(&query(&[("lat", "10"), ("lon", "20")]), &HashMap::new())
                .await
                .is_ok()
        );
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        assert!(Rule::regex("(").is_err());
    }
}
