use anyhow::Result;
use serde::Serialize;

/// Envelope wrapped around every `--json` payload.
#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    command: &'a str,
    generated_on: chrono::NaiveDate,
    data: &'a T,
}

/// Pretty-print a command's result as JSON to stdout.
pub fn print_json<T: Serialize>(command: &str, value: &T) -> Result<()> {
    println!("{}", to_json(command, value)?);
    Ok(())
}

pub fn to_json<T: Serialize>(command: &str, value: &T) -> Result<String> {
    let envelope = Envelope {
        command,
        generated_on: chrono::Utc::now().date_naive(),
        data: value,
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Stat;

    #[test]
    fn wraps_payload_with_command_name() {
        let payload: Vec<Stat<f64>> = vec![Stat::Value(1.5), Stat::Unknown];
        let json = to_json("members", &payload).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["command"], "members");
        assert_eq!(parsed["data"], serde_json::json!([1.5, null]));
        assert!(parsed["generated_on"].is_string());
    }
}
