pub mod gateway;
pub mod gemini;

pub use gateway::{
    API_KEY_ENV, ERROR_PREFIX, GatewaySettings, GeminiGateway, GenerationParams, MOCK_PREFIX,
    TextGenerator, mock_response,
};
