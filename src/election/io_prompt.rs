// Asking for the votes on a terminal.

use crate::election::*;

fn prompt_line<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> TResult<String> {
    write!(output, "{}", prompt).context(PromptSnafu {})?;
    output.flush().context(PromptSnafu {})?;
    let mut line = String::new();
    let n = input.read_line(&mut line).context(PromptSnafu {})?;
    ensure!(n > 0, EndOfInputSnafu {});
    Ok(line.trim().to_string())
}

// Asks again until the answer is a number.
fn prompt_count<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> TResult<u64> {
    loop {
        let line = prompt_line(input, output, prompt)?;
        match line.parse::<u64>() {
            Ok(n) => return Ok(n),
            Err(_) => debug!("prompt_count: not a number: {:?}", line),
        }
    }
}

/// Asks for the number of voters, then for the ranks of each voter.
///
/// Each name is checked as soon as it is entered. A name that is not a candidate,
/// or a candidate ranked twice, stops the prompt.
pub fn prompt_votes<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    builder: &mut Builder,
) -> TResult<()> {
    let voter_count = prompt_count(input, output, "Number of voters: ")?;
    for voter in 0..voter_count {
        let mut ranks: Vec<String> = Vec::new();
        for rank in 0..builder.num_candidates() {
            let name = prompt_line(input, output, &format!("Rank {}: ", rank + 1))?;
            if !builder.is_candidate(&name) {
                return InvalidVoteSnafu { name }.fail();
            }
            ranks.push(name);
        }
        builder
            .add_vote_simple(&ranks)
            .context(InvalidBallotSnafu {
                id: format!("voter {}", voter + 1),
            })?;
        writeln!(output).context(PromptSnafu {})?;
    }
    Ok(())
}
