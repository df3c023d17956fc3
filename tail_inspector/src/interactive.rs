use anyhow::{Context, bail};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tail_tracer::{BoundaryTrace, TracePipeline};

/// Everything an interactive session produced.
#[derive(Debug)]
pub struct SessionOutcome {
    pub image: PathBuf,
    pub trace: BoundaryTrace,
}

/// Prompt-driven session: sample blank space, pick a test image and a sensitivity, trace it.
///
/// Unreadable images and unparsable sensitivities are reported and asked for again;
/// closing the input ends the session with an error.
pub fn run_session<R: BufRead, W: Write>(
    pipeline: &mut TracePipeline,
    input: &mut R,
    output: &mut W,
) -> anyhow::Result<SessionOutcome> {
    loop {
        let path = prompt(input, output, "Please enter blank space sample file path: ")?;
        match pipeline.sample_background(&path) {
            Ok(background) => {
                writeln!(
                    output,
                    "\nBackground Avg: {}\nBackground Std: {}",
                    background.mean, background.std_dev
                )?;
                break;
            }
            Err(e) => writeln!(output, "{e}")?,
        }
    }

    let default_sensitivity = pipeline.config().scan.sensitivity;
    loop {
        let image = PathBuf::from(prompt(input, output, "\nPlease enter test image file path: ")?);
        let sensitivity = read_sensitivity(input, output, default_sensitivity)?;

        match pipeline.record_coordinates(&image, sensitivity) {
            Ok(trace) => return Ok(SessionOutcome { image, trace }),
            Err(e) => writeln!(output, "{e}")?,
        }
    }
}

fn read_sensitivity<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    default: f64,
) -> anyhow::Result<f64> {
    loop {
        let answer = prompt(
            input,
            output,
            "\nSelect sensitivity level (floating point)\nUniform backgrounds need higher sensitivity: ",
        )?;
        if answer.is_empty() {
            return Ok(default);
        }
        match answer.parse::<f64>() {
            Ok(value) if value.is_finite() && value >= 0.0 => return Ok(value),
            _ => writeln!(output, "'{answer}' is not a non-negative number")?,
        }
    }
}

fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, message: &str) -> anyhow::Result<String> {
    write!(output, "{message}")?;
    output.flush()?;

    let mut line = String::new();
    let read = input.read_line(&mut line).context("reading answer")?;
    if read == 0 {
        bail!("input closed before the session finished");
    }
    Ok(line.trim().to_string())
}
