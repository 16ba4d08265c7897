//! Prompt templates for the tutor.

/// How much stored tutorial text is carried as context into a
/// follow-up question.
pub const QUESTION_CONTEXT_CHARS: usize = 500;

/// Fixed-template tutorial prompt for a topic.
pub fn tutorial_prompt(topic: &str, language: &str) -> String {
    format!(
        "Create a brief educational tutorial about '{topic}' suitable for children.\n\
         Keep the response concise and focused.\n\
         \n\
         Include:\n\
         1. A short introduction (2-3 sentences)\n\
         2. 3 key points about the topic\n\
         3. 2 fun facts\n\
         4. A simple activity or question\n\
         5. 1-2 relevant image URLs (ending in .jpg, .jpeg, .png, or .gif)\n\
         6. 1 YouTube video link related to the topic\n\
         \n\
         Please ensure the content is:\n\
         1. Age-appropriate and simple\n\
         2. Engaging but brief\n\
         3. Clear and focused\n\
         \n\
         Please provide the response in {language} language.\n\
         Keep the total response under 500 words."
    )
}

/// Follow-up question prompt over a truncated slice of the stored
/// tutorial text.
pub fn question_prompt(question: &str, context: &str, language: &str) -> String {
    let context: String = context.chars().take(QUESTION_CONTEXT_CHARS).collect();
    format!(
        "Context: {context}\n\
         \n\
         Question: {question}\n\
         \n\
         Please provide a brief, child-friendly answer in 2-3 sentences.\n\
         Use simple language and keep it focused.\n\
         \n\
         Provide the response in {language} language."
    )
}

/// Image description prompt; sent alongside the inline image.
pub fn image_prompt(language: &str) -> String {
    format!(
        "Please give a very brief, child-friendly description of this image.\n\
         Keep it to 2-3 sentences.\n\
         Use simple language.\n\
         Provide the description in {language} language."
    )
}
