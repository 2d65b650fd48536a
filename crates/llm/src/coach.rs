//! System prompt for the chat coach.

use std::fmt::Write;

use strengths_api::{strengths, ChatMode};

/// The manager the coach is talking to.
#[derive(Debug, Clone, Default)]
pub struct CoachProfile {
    pub first_name: String,
    pub strengths: Vec<String>,
}

/// One person on the manager's team.
#[derive(Debug, Clone)]
pub struct MemberProfile {
    pub name: String,
    pub strengths: Vec<String>,
}

/// `Achiever (Executing), Woo (Influencing), …`
pub(crate) fn describe_strengths(list: &[String]) -> String {
    if list.is_empty() {
        return "not provided yet".to_string();
    }
    list.iter()
        .map(|s| match strengths::domain_of(s) {
            Some(domain) => format!("{s} ({domain})"),
            None => s.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn coach_system_prompt(
    profile: &CoachProfile,
    team: &[MemberProfile],
    mode: ChatMode,
) -> String {
    let mut prompt = String::from(
        "You are an expert CliftonStrengths coach helping a manager get the best \
         out of themselves and their team. Give practical, specific advice grounded \
         in the strengths below. Keep answers concise (under 300 words), use short \
         paragraphs or bullet points, and end with one concrete next step.\n\n",
    );

    let _ = writeln!(
        prompt,
        "Manager: {}\nTheir top 5 strengths: {}",
        if profile.first_name.is_empty() { "the user" } else { profile.first_name.as_str() },
        describe_strengths(&profile.strengths)
    );

    if team.is_empty() {
        prompt.push_str("\nThe manager has not added any team members yet.\n");
    } else {
        prompt.push_str("\nTeam members:\n");
        for member in team {
            let strengths = describe_strengths(&member.strengths);
            let _ = writeln!(prompt, "- {}: {strengths}", member.name);
        }
    }

    prompt.push('\n');
    prompt.push_str(match mode {
        ChatMode::MyStrengths => {
            "Focus on the manager's own strengths: how to apply them, manage their \
             blind spots and grow as a leader."
        }
        ChatMode::TeamStrengths => {
            "Focus on the team: collaboration between members, delegation that fits \
             each person's strengths, and how to resolve friction between styles."
        }
    });
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_lists_profile_and_team() {
        let profile = CoachProfile {
            first_name: "Ann".into(),
            strengths: vec!["Achiever".into(), "Woo".into()],
        };
        let team = vec![MemberProfile {
            name: "Dana".into(),
            strengths: vec!["Focus".into(), "Custom Thing".into()],
        }];
        let prompt = coach_system_prompt(&profile, &team, ChatMode::TeamStrengths);
        assert!(prompt.contains("Manager: Ann"));
        assert!(prompt.contains("Achiever (Executing), Woo (Influencing)"));
        assert!(prompt.contains("- Dana: Focus (Executing), Custom Thing"));
        assert!(prompt.contains("Focus on the team"));
    }

    #[test]
    fn prompt_handles_empty_profile() {
        let prompt = coach_system_prompt(&CoachProfile::default(), &[], ChatMode::MyStrengths);
        assert!(prompt.contains("not provided yet"));
        assert!(prompt.contains("not added any team members"));
    }
}
