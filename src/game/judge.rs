/// Outcome of comparing the player's entry with the round's target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict { Ongoing, Correct, Incorrect }

/// Judges only once the full length has been entered.  A wrong tap early in
/// the round is not reported until the last element is in.
pub fn evaluate(player: &[usize], target: &[usize]) -> Verdict {
    if player.len() < target.len() {
        Verdict::Ongoing
    } else if player == target {
        Verdict::Correct
    } else {
        Verdict::Incorrect
    }
}
