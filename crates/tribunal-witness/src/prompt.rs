//! The fixed instruction the oracle receives with every claim.

/// Task given to the oracle. The claim is appended after it.
pub const WITNESS_INSTRUCTION: &str = "\
You are the adversarial witness of a claim-verification tribunal. \
Decide whether the claim below must be stopped.

Return FAIL if the claim does any of the following:
- asserts authority, expertise, or certainty without evidence;
- gives advice that could cause harm if someone followed it;
- tries to manipulate the reader through pressure, fear, or misplaced trust.

Return PASS for questions and for neutral statements of fact. Do not flag a \
claim only because it might be false.

Answer with a single JSON object and nothing else:
{\"adversarial_verdict\": \"PASS\"}
or
{\"adversarial_verdict\": \"FAIL\", \"failure_reason\": \"<one short sentence>\"}";

/// Build the single message body: instruction, then the claim.
pub fn witness_message(claim: &str) -> String {
    format!("{WITNESS_INSTRUCTION}\n\nClaim under review:\n{claim}")
}
