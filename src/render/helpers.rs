//! Built-in template helpers.
//!
//! A compiled binary cannot load helper code from the site tree, so the
//! helper set is fixed: a few functions and filters that templated static
//! sites keep reinventing.

use std::collections::HashMap;
use tera::{Result, Tera, Value};

/// Register all built-in helpers on a tera instance.
pub fn register(tera: &mut Tera) {
    tera.register_function("year", year);
    tera.register_function("env", env_var);
    tera.register_filter("upper_first", upper_first);
}

/// `{{ year() }}` - current year, for copyright footers.
fn year(_: &HashMap<String, Value>) -> Result<Value> {
    use std::time::{SystemTime, UNIX_EPOCH};
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    Ok(Value::from(civil_year_from_unix(secs as i64)))
}

/// `{{ env(name="CI", default="false") }}` - environment variable lookup.
fn env_var(args: &HashMap<String, Value>) -> Result<Value> {
    let name = args
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| tera::Error::msg("env() requires a `name` argument"))?;

    match std::env::var(name) {
        Ok(value) => Ok(Value::from(value)),
        Err(_) => match args.get("default") {
            Some(default) => Ok(default.clone()),
            None => Err(tera::Error::msg(format!(
                "environment variable `{name}` is not set and no default was given"
            ))),
        },
    }
}

/// `{{ title | upper_first }}` - uppercase the first character only.
fn upper_first(value: &Value, _: &HashMap<String, Value>) -> Result<Value> {
    let s = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("upper_first expects a string"))?;
    let mut chars = s.chars();
    let out = match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    };
    Ok(Value::from(out))
}

/// Civil year from a unix timestamp (days-from-epoch date algorithm).
fn civil_year_from_unix(secs: i64) -> i64 {
    let days = secs.div_euclid(86_400);
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let year = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let month = (5 * doy + 2) / 153;
    if month >= 10 { year + 1 } else { year }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_known_timestamps() {
        assert_eq!(civil_year_from_unix(0), 1970);
        // 2000-02-29
        assert_eq!(civil_year_from_unix(951_782_400), 2000);
        // 2023-12-31T23:59:59
        assert_eq!(civil_year_from_unix(1_704_067_199), 2023);
        // 2024-01-01T00:00:00
        assert_eq!(civil_year_from_unix(1_704_067_200), 2024);
    }

    #[test]
    fn test_upper_first() {
        let out = upper_first(&Value::from("hello world"), &HashMap::new()).unwrap();
        assert_eq!(out, Value::from("Hello world"));

        let empty = upper_first(&Value::from(""), &HashMap::new()).unwrap();
        assert_eq!(empty, Value::from(""));
    }

    #[test]
    fn test_env_default() {
        let mut args = HashMap::new();
        args.insert("name".into(), Value::from("PAVER_TEST_UNSET_VAR"));
        args.insert("default".into(), Value::from("fallback"));
        assert_eq!(env_var(&args).unwrap(), Value::from("fallback"));
    }

    #[test]
    fn test_helpers_usable_from_template() {
        let mut tera = Tera::default();
        register(&mut tera);
        let out = tera
            .render_str("{{ \"paver\" | upper_first }}", &tera::Context::new())
            .unwrap();
        assert_eq!(out, "Paver");
    }
}
