//! Canned replies used when the chat backend cannot answer.
//!
//! The question is lowercased and checked against an ordered rule list;
//! the first rule with a matching keyword (English or Chinese) wins.

pub struct ReplyRule {
    pub topic: &'static str,
    pub keywords: &'static [&'static str],
    pub reply: &'static str,
}

pub const REPLY_RULES: &[ReplyRule] = &[
    ReplyRule {
        topic: "agents",
        keywords: &["agent", "代理"],
        reply: "We have several articles about AI Agents! Check out \"Building Your First AI Agent\" which covers the core concepts. You can also explore the Multi-Agent System Architecture article for advanced patterns. [View Articles](/articles?category=agents)",
    },
    ReplyRule {
        topic: "rag",
        keywords: &["rag", "知识库"],
        reply: "RAG (Retrieval Augmented Generation) is a powerful technique! We have a comprehensive article \"RAG System in Practice: Building a Smart Knowledge Base\" that covers implementation details. [Read Article](/articles/rag-implementation)",
    },
    ReplyRule {
        topic: "claude-api",
        keywords: &["claude", "api"],
        reply: "Looking for Claude API information? Check out our \"Complete Claude API Guide\" which covers authentication, best practices, and optimization techniques. [Read Guide](/articles/claude-api-guide)",
    },
    ReplyRule {
        topic: "prompt",
        keywords: &["prompt", "提示词"],
        reply: "Prompt engineering is crucial for getting good results from LLMs. Our article \"Prompt Engineering: Making AI Understand You Better\" covers essential techniques. [Learn More](/articles/prompt-engineering)",
    },
    ReplyRule {
        topic: "courses",
        keywords: &["course", "课程", "learn", "学习"],
        reply: "We offer two main courses:\n\n1. **AI Agent Development Bootcamp** - Learn to build intelligent agents from scratch\n2. **RAG Practical Course** - Master retrieval-augmented generation\n\nBoth include hands-on projects and community support. [View Courses](/courses)",
    },
    ReplyRule {
        topic: "projects",
        keywords: &["project", "项目", "github", "开源"],
        reply: "We have several open source projects including AI Chat Widget, RAG Template, and Agent Framework. All are available on GitHub with detailed documentation. [View Projects](/projects)",
    },
    ReplyRule {
        topic: "contact",
        keywords: &["contact", "联系", "about", "关于"],
        reply: "You can learn more about me on the About page. For business inquiries, please email contact@example.com. [About Me](/about)",
    },
];

pub const FALLBACK_REPLY: &str = "I can help you find information about our articles, courses, and projects. Feel free to ask about:\n\n- AI Agent development\n- RAG systems\n- LLM APIs (Claude, GPT)\n- Prompt engineering\n- Our courses and learning paths\n\nWhat would you like to know?";

/// The first rule whose keyword occurs in `question`, if any.
pub fn matching_rule(question: &str) -> Option<&'static ReplyRule> {
    let question = question.to_lowercase();
    REPLY_RULES.iter().find(|rule| {
        rule.keywords
            .iter()
            .any(|keyword| question.contains(keyword))
    })
}

pub fn mock_reply(question: &str) -> &'static str {
    matching_rule(question)
        .map(|rule| rule.reply)
        .unwrap_or(FALLBACK_REPLY)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(question: &str) -> Option<&'static str> {
        matching_rule(question).map(|rule| rule.topic)
    }

    #[test]
    fn rag_maps_to_rag_reply() {
        assert_eq!(topic("How does RAG work?"), Some("rag"));
        assert!(mock_reply("tell me about rag").contains("Retrieval Augmented Generation"));
    }

    #[test]
    fn chinese_keywords_match() {
        assert_eq!(topic("怎么搭建知识库"), Some("rag"));
        assert_eq!(topic("有什么课程"), Some("courses"));
        assert_eq!(topic("开源项目在哪里"), Some("projects"));
        assert_eq!(topic("如何联系你"), Some("contact"));
    }

    #[test]
    fn earlier_rules_win() {
        // "agent" is checked before "rag" and "api".
        assert_eq!(topic("an agent using the rag api"), Some("agents"));
        assert_eq!(topic("Claude prompt tips"), Some("claude-api"));
    }

    #[test]
    fn substring_matches_count() {
        // Plain substring search, so "storage" hits the rag rule.
        assert_eq!(topic("storage"), Some("rag"));
        assert_eq!(topic("capital"), Some("claude-api"));
        assert_eq!(topic("learning"), Some("courses"));
    }

    #[test]
    fn unmatched_input_gets_fallback() {
        assert_eq!(topic("hello there"), None);
        assert_eq!(mock_reply("hello there"), FALLBACK_REPLY);
    }
}
