//! The `gradewise init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("gradewise.toml").exists() {
        println!("gradewise.toml already exists, skipping.");
    } else {
        std::fs::write("gradewise.toml", SAMPLE_CONFIG)?;
        println!("Created gradewise.toml");
    }

    std::fs::create_dir_all("question-sets")?;
    let example_path = std::path::Path::new("question-sets/example.toml");
    if example_path.exists() {
        println!("question-sets/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_QUESTION_SET)?;
        println!("Created question-sets/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit gradewise.toml to adjust tolerances");
    println!("  2. Run: gradewise validate --questions question-sets/example.toml");
    println!("  3. Run: gradewise mark --questions question-sets/example.toml --text scan.txt");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# gradewise configuration

output_dir = "./gradewise-results"

[grading]
# Absolute tolerance for numeric answers.
numeric_tolerance = 0.001
# Tolerance for numeric comparison of algebraic expressions.
algebra_tolerance = 0.001
# Jaccard similarity needed for a short answer to count as correct.
short_answer_threshold = 0.7

[limits]
max_input_len = 1024
max_depth = 64
max_terms = 512
max_exponent = 32
"#;

const EXAMPLE_QUESTION_SET: &str = r#"[question_set]
id = "example"
name = "Example Question Set"
description = "One question of each answer type"

[[questions]]
id = "add"
answer_type = "numeric"
correct_answer = "4"
topic = "arithmetic"
prompt = "What is 2 + 2?"

[[questions]]
id = "solve"
answer_type = "algebra"
correct_answer = "x = 2"
topic = "linear equations"
prompt = "Solve 3x - 1 = 5."

[[questions]]
id = "organelle"
answer_type = "short_answer"
correct_answer = "the mitochondria is the powerhouse of the cell"
topic = "biology"
prompt = "What does the mitochondria do?"

[[questions]]
id = "planet"
answer_type = "mcq"
correct_answer = "B"
topic = "astronomy"
prompt = "Which planet is largest? A) Mars B) Jupiter C) Venus"
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_files_parse() {
        let config = gradewise_core::config::parse_config_str(SAMPLE_CONFIG).unwrap();
        assert_eq!(config.grading.numeric_tolerance, 0.001);
        assert!(config.grading.validate().is_ok());

        let set = gradewise_core::parser::parse_question_set_str(
            EXAMPLE_QUESTION_SET,
            std::path::Path::new("example.toml"),
        )
        .unwrap();
        assert_eq!(set.questions.len(), 4);
        assert!(gradewise_core::parser::validate_question_set(&set).is_empty());
    }
}
