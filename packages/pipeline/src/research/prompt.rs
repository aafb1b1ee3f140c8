//! Browsing-agent prompt construction.

/// Build the instruction sent to the browsing agent.
pub fn research_prompt(goal: &str, keys: &[String]) -> String {
    let lead = format!(
        "Starting from a google search, find {}. \
         Attempt to find this information without needing to log into any sites.",
        goal.trim()
    );

    match keys {
        [key] => format!(
            "{} Return an object with the following key: {}. \
             Do not nest additional keys or categories under this key, \
             it should just contain a single string.",
            lead, key
        ),
        _ => format!(
            "{} Return an object with the following keys: {}. \
             Do not nest additional keys or categories under these keys, \
             each of these keys should contain a single string.",
            lead,
            keys.join(", ")
        ),
    }
}
