// prompts.rs - Personas and Prompt Templates
// Every command sends a fixed system persona first, then one user message.

use crate::llm::ChatMessage;

pub const GREETING: &str = "Hello I am Llama Bot!";

const ASK_PERSONA: &str = "You are a helpful assistant that answers questions concisely and informatively in no more than 1000 words";

const SUMMARISE_PERSONA: &str = "You are a helpful assistant who summarises provided messages concisely and informatively in no more than 1000 words";

const TRANSCRIPT_PERSONA: &str = "You are a helpful assistant who provides a concise summary of provided Youtube Video transcript in bullet points";

const IDEAS_PERSONA: &str = "You are an expert youtube content creator who is an expert at analysing and extracting ideas from provided Youtube Video transcript";

pub fn ask(question: &str) -> Vec<ChatMessage> {
    vec![ChatMessage::system(ASK_PERSONA), ChatMessage::user(question)]
}

/// `history` is oldest first.
pub fn summarise(history: &[String]) -> Vec<ChatMessage> {
    let prompt = format!(
        "Summarise the following messages delimited by 3 backticks :\n```\n{}\n```",
        history.join("\n")
    );
    vec![ChatMessage::system(SUMMARISE_PERSONA), ChatMessage::user(prompt)]
}

pub fn transcript_summary(transcript: &str) -> Vec<ChatMessage> {
    vec![ChatMessage::system(TRANSCRIPT_PERSONA), ChatMessage::user(transcript)]
}

pub fn transcript_chunk_summary(chunk: &str) -> Vec<ChatMessage> {
    let prompt = format!(
        "Please provide a summary for the following chunk of the Youtube Video Transcript:\n{}",
        chunk
    );
    vec![ChatMessage::system(TRANSCRIPT_PERSONA), ChatMessage::user(prompt)]
}

pub fn key_ideas(transcript: &str) -> Vec<ChatMessage> {
    let prompt = format!("Extract 3 key ideas\n\nVideo Transcript:\n{}", transcript);
    vec![ChatMessage::system(IDEAS_PERSONA), ChatMessage::user(prompt)]
}
