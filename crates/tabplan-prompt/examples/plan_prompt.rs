use tabplan_ir::SchemaDescriptor;
use tabplan_prompt::PlanTranslator;

fn main() {
    let prompt = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "지역별로 그룹화하고 합계를 계산해줘".to_string());
    let schema = SchemaDescriptor::new(["Date", "Dept", "Amount", "Status", "Region", "Category"]);

    let translation = PlanTranslator::default().translate(&prompt, &schema);

    println!("prompt:    {}", prompt);
    println!("valid:     {:?}", translation.validation);
    println!("detectors: {:?}", translation.fired);
    match serde_json::to_string_pretty(&translation.plan) {
        Ok(json) => println!("{}", json),
        Err(e) => println!("Error: {:?}", e),
    }
}
