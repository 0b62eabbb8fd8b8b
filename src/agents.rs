//! Agent cards for the coordinator and its specialists.
//!
//! A card is the natural-language identity of an agent: its name, a one-line
//! description the router sees, and the instruction given to the LLM when
//! the agent phrases an answer.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgentCard {
    pub name: &'static str,
    pub description: &'static str,
    pub instruction: &'static str,
}

pub const COORDINATOR: AgentCard = AgentCard {
    name: "information_coordinator",
    description: "I coordinate between retrieving tech news, education news, and performing web searches.",
    instruction: "You are a helpful information assistant. You can:
1. Retrieve the latest tech news from Hacker News and trending GitHub repositories
2. Search the web for additional information when needed
3. Fetch the latest news and updates from the Department of Education (DepEd)

Use the appropriate agent based on the user's query:
- Use the hackernews_agent for questions about current tech news and GitHub trends
- Use the search_assistant for general questions requiring web search
- Use the deped_agent for questions about Department of Education news, updates, and official communications",
};

/// The agents the coordinator can delegate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Specialist {
    SearchAssistant,
    HackerNewsAgent,
    DepedAgent,
}

impl Specialist {
    pub const ALL: [Specialist; 3] = [
        Specialist::SearchAssistant,
        Specialist::HackerNewsAgent,
        Specialist::DepedAgent,
    ];

    pub fn card(self) -> AgentCard {
        match self {
            Specialist::SearchAssistant => AgentCard {
                name: "search_assistant",
                description: "Assistant that searches the web for general information, weather, and news",
                instruction: "You are a helpful assistant specializing in searching the web for:
- General information on any topic
- Current weather conditions and forecasts
- Latest news stories and updates

Answer from the search results provided. Cite the links you rely on.",
            },
            Specialist::HackerNewsAgent => AgentCard {
                name: "hackernews_agent",
                description: "Agent to get the top hackernews posts and trending github repos",
                instruction: "I can get the top hacker news posts and the trending github repos. \
Present them as a short list with titles and links.",
            },
            Specialist::DepedAgent => AgentCard {
                name: "deped_agent",
                description: "Agent that fetches and parses the latest news from the Department of Education (DepEd) RSS feed",
                instruction: "You are a helpful assistant specializing in providing the latest news and updates from the Department of Education (DepEd). \
You present the most recent articles, press releases, memoranda, and other official communications from DepEd.
Be sure to present the information in a clear, well-organized format.
If there's an issue connecting to the RSS feed, let the user know.",
            },
        }
    }

    pub fn name(self) -> &'static str {
        self.card().name
    }
}

impl fmt::Display for Specialist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = Specialist::ALL.iter().map(|s| s.name()).collect();
        names.dedup();
        assert_eq!(names.len(), 3);
        assert_eq!(Specialist::DepedAgent.to_string(), "deped_agent");
    }

    #[test]
    fn test_coordinator_mentions_every_specialist() {
        for s in Specialist::ALL {
            assert!(COORDINATOR.instruction.contains(s.name()));
        }
    }
}
