pub struct GradingService;

impl GradingService {
    /// Loose diagnosis match: the selection is accepted when either string,
    /// case-folded, contains the other. Both sides are free text, so partial
    /// names ("parkinson") and longer phrasings ("Influenza A") both count.
    pub fn is_match(selection: &str, ground_truth: &str) -> bool {
        let selected = selection.to_lowercase();
        let expected = ground_truth.to_lowercase();
        selected.contains(&expected) || expected.contains(&selected)
    }
}
