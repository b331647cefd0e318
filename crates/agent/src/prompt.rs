//! The fixed ReAct instruction template.
//!
//! Tool descriptions are rendered verbatim, in registry order; the
//! template closes with the scratchpad so every iteration replays the
//! whole chain back to the model. The template ends mid-line after
//! `Thought:` — the model continues from there, which is why the first
//! thought of a chain carries no marker in the scratchpad itself.

use reagent_tools::ToolRegistry;

/// Render the full prompt for one loop iteration.
pub fn render_prompt(tools: &ToolRegistry, question: &str, scratchpad: &str) -> String {
    format!(
        "Answer the following questions as best you can. You have access to the following tools: \n\
{descriptors}\n\
\n\
Use the following format:\n\
Question: the input question you must answer\n\
Thought: you should always think about what to do\n\
Action: the action to take, should be one of [{names}]\n\
Action Input: the input to the action\n\
Observation: the result of the action\n\
... (this Thought/Action/Action Input/Observation can repeat N times)\n\
Thought: I now know the final answer\n\
Final Answer: the final answer to the original input question.\n\
\n\
Begin!\n\
Question: {question}\n\
Thought: {scratchpad}",
        descriptors = tools.descriptor_block(),
        names = tools.names().join(", "),
    )
}
