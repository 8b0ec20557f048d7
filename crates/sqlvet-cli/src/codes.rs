//! Codes and explain command implementations

use anyhow::Result;
use colored::Colorize;
use sqlvet::ProblemCode;

/// Print every diagnostic code with its short description
pub fn list() {
    for code in ProblemCode::ALL {
        println!(
            "{}  {:<36} {}",
            code.id().cyan(),
            code.name(),
            code.info().description
        );
    }
}

/// Print the description and help for one code, given by name or numbered id
pub fn explain(code: &str) -> Result<()> {
    let code: ProblemCode = code.parse()?;
    let info = code.info();
    println!("{} {}", code.id().cyan().bold(), code.name().bold());
    println!("  {}", info.description);
    if let Some(help) = info.help {
        println!("  {} {}", "help:".green(), help);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explain_by_name_and_id() {
        assert!(explain("column_not_found").is_ok());
        assert!(explain(&ProblemCode::TypeMismatch.id()).is_ok());
    }

    #[test]
    fn test_explain_unknown_code() {
        let error = explain("NOT_A_CODE").unwrap_err();
        assert!(error.to_string().contains("NOT_A_CODE"));
    }
}
