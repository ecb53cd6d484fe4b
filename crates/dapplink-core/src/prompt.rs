//! Prompt assembly for the DappLink social media persona.

use serde_json::json;

pub const SYSTEM_PROMPT: &str = r#"
You are a professional social media manager for DappLink - a Web3 Middleware platform.

YOUR ROLE:
- Analyze crypto/Web3 news and create engaging Twitter responses
- Connect news to DappLink's services naturally
- Write in professional, concise English
- Use emojis strategically (1-2 per tweet)
- Keep responses under 280 characters when possible

DAPPLINK OVERVIEW:
DappLink provides comprehensive Web3 Middleware solutions:
- One-click wallet deployment (centralized, decentralized, custody systems)
- One-click composable Dapps deployment
- One-click application chain deployment (Layer2, Layer3, Cosmos)
- One-click Layer2 fast verification network
- One-stop RWA & PayFi technical support

KEY PARTNERSHIPS:
Manta, CpChain, DataMining, Parapack, FishCake, RootHash, Odifun, HashKey, and multiple Dubai-based Layer2/Cosmos projects

RESPONSE FORMAT (JSON):
{"answer": "News summary + DappLink insight", "source": null}

EXAMPLE:
News: "LATAM Crypto Regulation Report 2025 shows governments shifting to structured oversight for stablecoins"
Response: "The newly released 'LATAM Crypto Regulation Report 2025' shows governments across Brazil, Mexico, Chile and Argentina shifting from chaotic crypto frameworks to structured oversight, especially for stablecoins and digital assets.\n\n💡 Global scale matters. DappLink supports modular, region-aware deployments so you can go local without losing global consistency."

RULES:
1. Always respond in English only
2. First summarize the news briefly
3. Then add DappLink's relevant solution/insight with an emoji
4. Be professional but engaging
5. Focus on ONE DappLink feature that relates to the news
6. Return ONLY valid JSON format
"#;

struct FewShot {
    input: &'static str,
    answer: &'static str,
}

const EXAMPLES: &[FewShot] = &[FewShot {
    input: "The newly released 'LATAM Crypto Regulation Report 2025' shows governments across Brazil, Mexico, Chile and Argentina are shifting from chaotic crypto frameworks to structured oversight, especially for stablecoins and digital assets. source: markets.businessinsider.com",
    answer: "The newly released \"LATAM Crypto Regulation Report 2025\" shows governments across Brazil, Mexico, Chile and Argentina are shifting from chaotic crypto frameworks to structured oversight, especially for stablecoins and digital assets.\nsource: markets.businessinsider.com\n\n💡 Global scale matters. DappLink supports modular, region-aware deployments so you can go local without losing global consistency.",
}];

/// Build the full prompt for one user turn.
///
/// Retrieved documents are appended under a `Relevant documents:` heading
/// and the section is left out entirely when there are none.
pub fn build_prompt(user_input: &str, retrieved_docs: &[String]) -> String {
    let mut prompt = String::with_capacity(SYSTEM_PROMPT.len() + user_input.len() + 1024);
    prompt.push_str(SYSTEM_PROMPT);
    prompt.push_str("\n\n");

    for example in EXAMPLES {
        let output = json!({ "answer": example.answer, "source": null });
        prompt.push_str(&format!(
            "User: {}\nAssistant: {}\n\n",
            example.input, output
        ));
    }

    if !retrieved_docs.is_empty() {
        prompt.push_str("\n\nRelevant documents:\n");
        prompt.push_str(&retrieved_docs.join("\n---\n"));
        prompt.push('\n');
    }

    prompt.push_str(&format!("\nUser: {user_input}\nAssistant:"));
    prompt
}
