//! The fixed demonstration crews and chats run by the binary.
use std::sync::Arc;

use crate::{
    agent::Agent,
    chat::{ChatError, ConversableAgent},
    config::Settings,
    crew::{Crew, CrewBuilder, CrewError, Process},
    llm::{Model, request::GenerationConfig},
    report::PREVIEW_CHARS,
    task::Task,
};

pub type CrewFactory = fn(&Arc<dyn Model>, &Settings) -> Result<Crew, CrewError>;

/// A crew the binary runs, and how much of each result it prints.
#[derive(Clone, Copy)]
pub struct CrewDemo {
    pub name: &'static str,
    pub build: CrewFactory,
    pub preview_chars: Option<usize>,
}

/// The travel crews. The enhanced flight crew prints its full analysis.
pub const TRAVEL_CREWS: [CrewDemo; 3] = [
    CrewDemo {
        name: "Flight Crew",
        build: flight_crew,
        preview_chars: Some(PREVIEW_CHARS),
    },
    CrewDemo {
        name: "Enhanced Flight Crew",
        build: enhanced_flight_crew,
        preview_chars: None,
    },
    CrewDemo {
        name: "Trip Planning Crew",
        build: trip_planning_crew,
        preview_chars: Some(PREVIEW_CHARS),
    },
];

pub const BUSINESS_CREWS: [CrewDemo; 2] = [
    CrewDemo {
        name: "Conference Planning",
        build: conference_crew,
        preview_chars: Some(PREVIEW_CHARS),
    },
    CrewDemo {
        name: "Marketing Strategy",
        build: marketing_crew,
        preview_chars: Some(PREVIEW_CHARS),
    },
];

pub const ARCHITECTURE_CREW: CrewDemo = CrewDemo {
    name: "Software Architecture",
    build: architecture_crew,
    preview_chars: Some(PREVIEW_CHARS),
};

pub const TRAVEL_CHAT_MESSAGE: &str =
    "Provide 3 quick tips for booking affordable flights to Iceland";
pub const TRAVEL_CHAT_MAX_TURNS: usize = 2;

pub const RESEARCH_CHAT_MESSAGE: &str = "Create a detailed outline for a research paper on \
    \"Ethical AI in Healthcare: Balancing Innovation and Patient Privacy\". Include abstract \
    structure, introduction, literature review sections, methodology, expected results, and \
    conclusion frameworks.";
pub const RESEARCH_CHAT_MAX_TURNS: usize = 2;

fn crew_builder(model: &Arc<dyn Model>, settings: &Settings, name: &str) -> CrewBuilder {
    CrewBuilder::new_with_shared_model(Arc::clone(model))
        .name(name)
        .process(Process::Sequential)
        .settings(settings)
}

fn flight_specialist() -> Result<Arc<Agent>, CrewError> {
    Ok(Arc::new(
        Agent::builder()
            .role("Flight Specialist")
            .goal("Find the best flights for the trip")
            .backstory("You have booked thousands of flights and know the best times to fly.")
            .allow_delegation(false)
            .build()?,
    ))
}

/// One agent, one task: quick flight research.
pub fn flight_crew(model: &Arc<dyn Model>, settings: &Settings) -> Result<Crew, CrewError> {
    let flight_agent = flight_specialist()?;
    let task = Task::builder()
        .description("Research flights from NYC to Reykjavik and provide 3 quick booking tips")
        .expected_output("List of flight options with prices and booking tips")
        .agent(Arc::clone(&flight_agent))
        .build()?;

    crew_builder(model, settings, "Flight Crew")
        .add_agent(flight_agent)
        .add_task(task)
        .build()
}

/// The detailed flight specialist with a five-point research brief.
pub fn enhanced_flight_crew(
    model: &Arc<dyn Model>,
    settings: &Settings,
) -> Result<Crew, CrewError> {
    let flight_agent = Arc::new(
        Agent::builder()
            .role("Senior Flight Research Specialist")
            .goal(
                "Find the most cost-effective and convenient flight options while analyzing \
                 pricing trends, route efficiency, and traveler preferences to deliver optimal \
                 booking recommendations",
            )
            .backstory(
                "You are a seasoned travel industry expert with over 15 years of experience in \
                 airline operations, booking systems, and travel optimization. You know airline \
                 pricing algorithms and fare classes, route networks and hub-and-spoke systems, \
                 seasonal pricing trends and booking windows, alliances and codeshares, ancillary \
                 fees, and loyalty programs. You have helped over 10,000 travelers find the right \
                 flights.",
            )
            .allow_delegation(false)
            .verbose(true)
            .build()?,
    );

    let task = Task::builder()
        .description(
            "Research and analyze flight options from New York (JFK/LGA/EWR) to Reykjavik, \
             Iceland (KEF) for travel dates January 15-20, 2026. Provide:\n\
             1. At least 3 different flight options with detailed pricing\n\
             2. Analysis of direct vs connecting flights\n\
             3. Recommendations on optimal booking timing\n\
             4. Comparison of airline amenities and policies\n\
             5. Tips for maximizing value (upgrades, loyalty points, etc.)\n\
             Consider flight duration, departure times, airline reliability, and overall \
             passenger experience in your recommendations.",
        )
        .expected_output(
            "Comprehensive flight analysis with specific recommendations, pricing details, and \
             booking strategy for NYC to Reykjavik travel",
        )
        .agent(Arc::clone(&flight_agent))
        .build()?;

    crew_builder(model, settings, "Enhanced Flight Crew")
        .add_agent(flight_agent)
        .add_task(task)
        .verbose(true)
        .build()
}

/// Two agents in sequence: flights first, then budget advice.
pub fn trip_planning_crew(
    model: &Arc<dyn Model>,
    settings: &Settings,
) -> Result<Crew, CrewError> {
    let flight_agent = flight_specialist()?;
    let budget_advisor = Arc::new(
        Agent::builder()
            .role("Travel Budget Advisor")
            .goal("Keep the whole trip affordable without sacrificing the experience")
            .backstory("You plan frugal trips to expensive destinations for a living.")
            .build()?,
    );

    let research = Task::builder()
        .description("Research flights from NYC to Reykjavik for a week in January")
        .expected_output("Three flight options with prices")
        .agent(Arc::clone(&flight_agent))
        .build()?;
    let budget = Task::builder()
        .description("Summarize budget tips for a week-long trip to Iceland")
        .expected_output("A short list of money-saving tips")
        .agent(Arc::clone(&budget_advisor))
        .build()?;

    crew_builder(model, settings, "Trip Planning Crew")
        .agents(vec![flight_agent, budget_advisor])
        .tasks(vec![research, budget])
        .build()
}

fn single_agent_crew(
    model: &Arc<dyn Model>,
    settings: &Settings,
    name: &str,
    agent: Agent,
    description: &str,
    expected_output: &str,
) -> Result<Crew, CrewError> {
    let agent = Arc::new(agent);
    let task = Task::builder()
        .description(description)
        .expected_output(expected_output)
        .agent(Arc::clone(&agent))
        .build()?;

    crew_builder(model, settings, name)
        .add_agent(agent)
        .add_task(task)
        .build()
}

pub fn conference_crew(model: &Arc<dyn Model>, settings: &Settings) -> Result<Crew, CrewError> {
    let planner = Agent::builder()
        .role("Senior Conference Program Manager")
        .goal(
            "Design engaging and well-structured conference agendas that maximize learning and \
             networking opportunities",
        )
        .backstory(
            "You are an experienced event planner with 12+ years organizing tech conferences, \
             academic symposiums, and industry summits. You understand audience engagement, \
             speaker logistics, timing optimization, and creating memorable experiences. You've \
             successfully planned over 200 events.",
        )
        .build()?;

    single_agent_crew(
        model,
        settings,
        "Conference Planning Crew",
        planner,
        "Plan a 3-day AI & Machine Learning conference agenda for 300 attendees. Include:\n\
         - Daily themes and focus areas\n\
         - Keynote speakers and session topics\n\
         - Break timing and networking opportunities\n\
         - Workshop sessions and hands-on labs\n\
         - Panel discussions and Q&A sessions\n\
         - Meals and social events",
        "Detailed 3-day conference schedule with times, speakers, and session descriptions",
    )
}

pub fn marketing_crew(model: &Arc<dyn Model>, settings: &Settings) -> Result<Crew, CrewError> {
    let strategist = Agent::builder()
        .role("Senior Marketing Strategy Director")
        .goal(
            "Develop comprehensive marketing strategies that drive customer acquisition and brand \
             growth",
        )
        .backstory(
            "You are a seasoned marketing executive with expertise in digital marketing, brand \
             positioning, customer segmentation, and growth hacking. You've launched successful \
             campaigns for Fortune 500 companies and startups.",
        )
        .build()?;

    single_agent_crew(
        model,
        settings,
        "Marketing Strategy Crew",
        strategist,
        "Design a comprehensive marketing strategy for a new AI-powered productivity app. \
         Include:\n\
         - Target audience analysis and personas\n\
         - Brand positioning and unique value proposition\n\
         - Marketing channel mix (digital, content, social, etc.)\n\
         - Campaign timeline and budget allocation\n\
         - Key performance indicators and success metrics\n\
         - Competitive differentiation strategy",
        "Complete marketing strategy document with actionable tactics and measurable goals",
    )
}

pub fn architecture_crew(model: &Arc<dyn Model>, settings: &Settings) -> Result<Crew, CrewError> {
    let architect = Agent::builder()
        .role("Principal Software Architect")
        .goal(
            "Design scalable, maintainable software architectures that meet business requirements \
             and technical constraints",
        )
        .backstory(
            "You are a senior software architect with 15+ years experience designing enterprise \
             systems, microservices, and cloud-native applications. You have deep expertise in \
             system design, database architecture, security patterns, and performance \
             optimization.",
        )
        .build()?;

    single_agent_crew(
        model,
        settings,
        "Software Architecture Crew",
        architect,
        "Plan a software architecture for a real-time collaborative document editing platform. \
         Include:\n\
         - High-level system architecture and components\n\
         - Database design and data flow patterns\n\
         - Real-time synchronization strategy\n\
         - Scalability and performance considerations\n\
         - Security and authentication approach\n\
         - Technology stack recommendations\n\
         - Deployment and infrastructure requirements",
        "Comprehensive software architecture plan with technology choices and implementation \
         strategy",
    )
}

/// `(user_proxy, assistant)` for the travel-advice chat.
pub fn travel_chat(
    generation: GenerationConfig,
) -> Result<(ConversableAgent, ConversableAgent), ChatError> {
    let assistant = ConversableAgent::builder()
        .name("assistant")
        .system_message("You are a helpful AI assistant specializing in travel advice.")
        .generation(generation)
        .build()?;
    let user_proxy = ConversableAgent::builder()
        .name("user_proxy")
        .system_message("You are a user proxy that initiates conversations.")
        .generation(generation)
        .build()?;
    Ok((user_proxy, assistant))
}

/// `(director, scholar)` for the research-outline chat.
pub fn research_chat(
    generation: GenerationConfig,
) -> Result<(ConversableAgent, ConversableAgent), ChatError> {
    let scholar = ConversableAgent::builder()
        .name("ResearchScholar")
        .system_message(
            "You are a distinguished academic researcher with expertise in computer science and \
             artificial intelligence. You have published 50+ peer-reviewed papers and understand \
             research methodology, literature review processes, and academic writing standards. \
             You excel at creating well-structured research outlines that follow academic \
             conventions.",
        )
        .generation(generation)
        .build()?;
    let director = ConversableAgent::builder()
        .name("ResearchDirector")
        .system_message("You initiate research tasks and coordinate academic projects.")
        .generation(generation)
        .build()?;
    Ok((director, scholar))
}
