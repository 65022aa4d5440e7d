//! Prompt text for the built-in agents.

/// System prompt for the data analysis agent.
pub const ANALYSIS_SYSTEM_PROMPT: &str = "You are a data analysis expert. Use the available tools to analyze sales data and provide insights. The database contains columns: date, revenue, units_sold, region, product_category.";

/// System prompt for the web research agent.
pub const RESEARCH_SYSTEM_PROMPT: &str = "You are a web research specialist. Use the available tools to gather information from the web, analyze websites, and provide comprehensive research insights. Always cite sources and provide actionable intelligence.";

pub const ANALYSIS_SAMPLE_QUERIES: &[&str] = &[
    "What is the total revenue for the year?",
    "Which region has the highest sales?",
    "Show me monthly revenue trends",
    "Calculate the average daily revenue",
    "Generate a summary report for Electronics category",
];

pub const RESEARCH_SAMPLE_QUERIES: &[&str] = &[
    "Research the latest trends in AI development",
    "Analyze the website structure of tesla.com",
    "Find information about sustainable energy solutions",
    "Compare the features of top project management tools",
    "Research market trends for electric vehicles",
];
