mod llm_client;
mod session;
