use normalizer_core::core::engine::ItemUpdate;
use normalizer_core::core::parser::NameParser;
use normalizer_core::core::types::{CreatorRecord, NormalizationResult, ResultStatus, Suggestion};
use normalizer_core::persistence::FileBackend;
use normalizer_core::NormalizationEngine;
use std::io::{stdin, stdout, Write};

const DEFAULT_STORE_PATH: &str = "author_mappings.bin";

struct ConsoleUpdater;

impl ItemUpdate for ConsoleUpdater {
    fn update_creator(&mut self, original: &str, normalized: &str) {
        println!("  updated library: '{}' -> '{}'", original, normalized);
    }
}

fn main() {
    let store_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_STORE_PATH.to_string());
    let backend = FileBackend::open_or_empty(std::path::Path::new(&store_path));
    let mut engine = NormalizationEngine::new(Box::new(backend));
    let parser = NameParser::new();

    let mut session_creators: Vec<CreatorRecord> = Vec::new();
    let mut pending: Option<(NormalizationResult, Vec<Suggestion>)> = None;

    println!("Author Name Normalizer. Enter a name, or one of:");
    println!("  :N       accept suggestion N for the last entered name");
    println!("  analyze  surname-frequency and variant-pair report for this session");
    println!("  export   print learned mappings as JSON");
    println!("  exit     save and quit");
    println!("---------------------------------------------------------------");

    loop {
        print!("> ");
        let _ = stdout().flush();

        let mut input = String::new();
        if stdin().read_line(&mut input).is_err() {
            break;
        }
        let cmd = input.trim();

        match cmd {
            "exit" => break,
            "" => continue,
            "analyze" => {
                let items: Vec<Vec<CreatorRecord>> =
                    session_creators.iter().cloned().map(|c| vec![c]).collect();
                let analysis = engine.perform_library_analysis(&items);
                println!(
                    "{} names, {} unique surnames",
                    analysis.total_names, analysis.unique_surnames
                );
                for pair in &analysis.potential_variants {
                    println!(
                        "  possible variants: '{}' ({}x) / '{}' ({}x)  similarity {:.3}",
                        pair.name1, pair.frequency1, pair.name2, pair.frequency2, pair.similarity
                    );
                }
            }
            "export" => {
                let mappings: Vec<_> = engine.learning().mappings().collect();
                match serde_json::to_string_pretty(&mappings) {
                    Ok(json) => println!("{}", json),
                    Err(e) => eprintln!("[ERROR] could not serialize mappings: {}", e),
                }
            }
            s if s.starts_with(':') && s.len() > 1 => {
                let Some((result, suggestions)) = pending.take() else {
                    println!("nothing to accept yet, enter a name first");
                    continue;
                };
                match s[1..].parse::<usize>() {
                    Ok(n) if n >= 1 && n <= suggestions.len() => {
                        let chosen = suggestions[n - 1].text.clone();
                        let mut accepted = result;
                        accepted.accepted = true;
                        accepted.normalized = Some(chosen.clone());
                        engine.apply_normalizations(&[accepted], &mut ConsoleUpdater, true);
                        println!("learned: '{}'", chosen);
                    }
                    _ => {
                        println!("no suggestion {}", &s[1..]);
                        pending = Some((result, suggestions));
                    }
                }
            }
            raw => {
                let parsed = parser.parse(raw);
                let creator =
                    CreatorRecord::new(&parsed.first_name, &parsed.last_name, "author");
                session_creators.push(creator.clone());

                let results = engine.process_creators(&[creator]);
                let Some(result) = results.into_iter().next() else {
                    println!("could not read a name out of that input");
                    continue;
                };

                match result.status {
                    ResultStatus::Learned => println!("known name (learned mapping found):"),
                    ResultStatus::New => println!("new name:"),
                }
                let suggestions = engine.ranked_suggestions(&result);
                for (i, suggestion) in suggestions.iter().enumerate() {
                    println!(
                        "  {}: {:<30} [{:?}, {:.3}]",
                        i + 1,
                        suggestion.text,
                        suggestion.source,
                        suggestion.score
                    );
                }
                pending = Some((result, suggestions));
            }
        }
    }

    println!("Saving mapping store...");
    if let Err(e) = engine.save() {
        eprintln!("[ERROR] Could not save mapping store: {}", e);
    } else {
        println!("Mapping store saved to '{}'", store_path);
    }
}
