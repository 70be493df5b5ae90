use std::io::{ErrorKind, Result, Write};

use serde_json::{Map, Value};

use crate::color::Theme;

#[derive(Clone, Debug)]
pub enum CommandOutputType {
    Message(String),
    Result {
        fields: Vec<(&'static str, Value)>,
        human_readable_template: String,
    },
    Error(String),
}

/// One row of program output.
#[derive(Clone, Debug)]
pub struct CommandOutput {
    /// The step of the run that produced this row.
    pub stage: &'static str,
    pub success: bool,
    pub output: CommandOutputType,
}

impl CommandOutput {
    pub fn message(stage: &'static str, message: &str) -> Self {
        Self {
            stage,
            success: true,
            output: CommandOutputType::Message(message.into()),
        }
    }

    pub fn result(stage: &'static str) -> Self {
        Self {
            stage,
            success: true,
            output: CommandOutputType::Result {
                fields: vec![],
                human_readable_template: String::default(),
            },
        }
    }

    pub fn error(stage: &'static str, message: &str) -> Self {
        Self {
            stage,
            success: false,
            output: CommandOutputType::Error(message.into()),
        }
    }

    pub fn with_field(mut self, key: &'static str, value: impl Into<Value>) -> Self {
        if let CommandOutputType::Result { fields, .. } = &mut self.output {
            fields.push((key, value.into()));
        }
        self
    }

    pub fn with_human_readable_template(mut self, template: &'static str) -> Self {
        if let CommandOutputType::Result {
            human_readable_template,
            ..
        } = &mut self.output
        {
            *human_readable_template = template.into();
        }
        self
    }

    fn to_json(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("stage".to_string(), Value::from(self.stage));
        obj.insert("success".to_string(), Value::from(self.success));

        match &self.output {
            CommandOutputType::Message(message) => {
                obj.insert("message".to_string(), Value::from(message.as_str()));
            }
            CommandOutputType::Result { fields, .. } => {
                for (key, value) in fields {
                    obj.insert((*key).to_string(), value.clone());
                }
            }
            CommandOutputType::Error(message) => {
                obj.insert("error".to_string(), Value::from(message.as_str()));
            }
        }

        Value::Object(obj)
    }

    fn safe_write_line(output_stream: &mut dyn Write, line: &str) -> Result<()> {
        match writeln!(output_stream, "{line}") {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::BrokenPipe => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub fn write_json(&self, output_stream: &mut dyn Write) -> Result<()> {
        let line = serde_json::to_string(&self.to_json())?;
        Self::safe_write_line(output_stream, &line)
    }

    pub fn write(&self, output_stream: &mut dyn Write, theme: Option<&Theme>) -> Result<()> {
        match &self.output {
            CommandOutputType::Message(message) => {
                let styled_msg = if let Some(t) = theme {
                    t.info_msg(message).to_string()
                } else {
                    message.clone()
                };
                Self::safe_write_line(output_stream, &styled_msg)
            }
            CommandOutputType::Result {
                fields,
                human_readable_template,
            } => {
                let mut output = human_readable_template.clone();
                for (key, value) in fields {
                    let placeholder = format!("{{{key}}}");
                    let plain = match value {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    let formatted_value = if let Some(t) = theme {
                        t.field(&plain).to_string()
                    } else {
                        plain
                    };
                    output = output.replace(&placeholder, &formatted_value);
                }

                let final_line = if let Some(t) = theme {
                    t.result_msg(&output).to_string()
                } else {
                    output
                };
                Self::safe_write_line(output_stream, &final_line)
            }
            CommandOutputType::Error(message) => {
                let line = format!("ERROR ({}): {message}", self.stage);
                let colored_line = if let Some(t) = theme {
                    t.error_msg(&line).to_string()
                } else {
                    line
                };
                Self::safe_write_line(output_stream, &colored_line)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(output: &CommandOutput) -> String {
        let mut buffer = Vec::new();
        output.write(&mut buffer, None).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    fn render_json(output: &CommandOutput) -> Value {
        let mut buffer = Vec::new();
        output.write_json(&mut buffer).unwrap();
        serde_json::from_slice(&buffer).unwrap()
    }

    #[test]
    fn test_result_template() {
        let output = CommandOutput::result("put")
            .with_field("key", "config/dev/app/a/db/host")
            .with_field("value", "localhost")
            .with_human_readable_template("{key} = {value}");

        assert_eq!(render(&output), "config/dev/app/a/db/host = localhost\n");
    }

    #[test]
    fn test_numeric_fields() {
        let output = CommandOutput::result("summary")
            .with_field("written", 3)
            .with_human_readable_template("{written} written");

        assert_eq!(render(&output), "3 written\n");
        assert_eq!(
            render_json(&output),
            serde_json::json!({ "stage": "summary", "success": true, "written": 3 })
        );
    }

    #[test]
    fn test_error_row() {
        let output = CommandOutput::error("put", "config/x: refused");

        assert_eq!(render(&output), "ERROR (put): config/x: refused\n");
        assert_eq!(
            render_json(&output),
            serde_json::json!({ "stage": "put", "success": false, "error": "config/x: refused" })
        );
    }

    #[test]
    fn test_message_row() {
        let output = CommandOutput::message("dry-run", "Nothing was written");

        assert_eq!(render(&output), "Nothing was written\n");
        assert_eq!(render_json(&output)["message"], "Nothing was written");
    }

    #[test]
    fn test_fields_on_non_result_are_ignored() {
        let output = CommandOutput::message("m", "hi").with_field("key", "v");
        assert_eq!(render_json(&output).get("key"), None);
    }
}
