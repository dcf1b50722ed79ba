//! Core pipeline
//!
//! Runs the stages strictly in order: read, exclude, spell-check, normalize,
//! limit, write. Each stage consumes the whole record set; the first failing
//! stage aborts the run.

use crate::cli::Args;
use crate::encoding::encoding_for_label;
use crate::error::WordlistError;
use crate::filter::ExclusionFilter;
use crate::limit::SizeLimiter;
use crate::normalize::{Normalizer, Scale};
use crate::output::{CombinedWriter, Header};
use crate::progress::{
    create_progress_bar, create_spinner, print_bullet, print_header, print_info, print_success, print_warning,
    PipelineStats,
};
use crate::record::{BigramRecord, WordRecord};
use crate::source::{DumpFormat, SourceData, SourceReader};
use crate::spelling::{hunspell_path, SpellingDictionary};

use bytesize::ByteSize;
use colored::*;
use encoding_rs::Encoding;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub lang: String,
    pub input: PathBuf,
    pub output: PathBuf,
    pub description: String,
    pub format: DumpFormat,
    pub scale: Scale,
    pub floor: u8,
    pub bigram_floor: u8,
    pub comment_marker: Option<String>,
    pub encoding: Option<&'static Encoding>,
    pub profanity: Option<PathBuf>,
    pub offensive: Option<PathBuf>,
    pub dictionary: Option<PathBuf>,
    pub limit: Option<usize>,
    pub bigram_limit: usize,
    pub date: u64,
    pub buffer_size: usize,
    pub dry_run: bool,
    pub quiet: bool,
    pub verbose: bool,
}

impl PipelineConfig {
    pub fn from_args(args: &Args) -> anyhow::Result<Self> {
        let encoding = match args.encoding {
            Some(ref label) => Some(
                encoding_for_label(label).ok_or_else(|| anyhow::anyhow!("Unknown encoding label: '{}'", label))?,
            ),
            None => None,
        };

        let dictionary = match (&args.dictionary, &args.hunspell_dir) {
            (Some(path), _) => Some(path.clone()),
            (None, Some(dir)) => Some(hunspell_path(dir, &args.lang)),
            (None, None) => None,
        };

        Ok(Self {
            lang: args.lang.clone(),
            input: args.input.clone(),
            output: args.output.clone(),
            description: args.description.clone(),
            format: args.format,
            scale: args.get_scale(),
            floor: args.floor,
            bigram_floor: args.bigram_floor,
            comment_marker: args.get_comment_marker().map(str::to_string),
            encoding,
            profanity: args.profanity.clone(),
            offensive: args.offensive.clone(),
            dictionary,
            limit: args.limit,
            bigram_limit: args.get_bigram_limit(),
            date: resolve_date(args.date, &args.input),
            buffer_size: args.parse_buffer_size()?,
            dry_run: args.dry_run,
            quiet: args.quiet,
            verbose: args.verbose,
        })
    }
}

/// Header date: explicit value, then `SOURCE_DATE_EPOCH`, then input mtime
///
/// Never the wall clock, so identical inputs give identical output.
pub fn resolve_date(explicit: Option<u64>, input: &Path) -> u64 {
    if let Some(date) = explicit {
        return date;
    }
    if let Some(date) = std::env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|v| v.trim().parse().ok())
    {
        return date;
    }
    fs::metadata(input)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Records that made it through every stage, in output order
#[derive(Debug)]
pub struct FinalRecords {
    pub words: Vec<WordRecord>,
    pub bigrams: Vec<BigramRecord>,
}

/// Main pipeline
pub struct Pipeline {
    config: PipelineConfig,
    stats: PipelineStats,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            stats: PipelineStats::new(),
        }
    }

    /// Run every stage and write the combined wordlist
    pub fn run(&mut self) -> anyhow::Result<()> {
        // Lists are loaded before the dump so a bad list path fails fast
        let filter = ExclusionFilter::from_paths(self.config.profanity.as_deref(), self.config.offensive.as_deref())?;
        let dictionary = match self.config.dictionary {
            Some(ref path) => Some(SpellingDictionary::from_file(path)?),
            None => None,
        };

        let source = self.read_source()?;
        let records = self.transform(source, &filter, dictionary.as_ref())?;

        if self.config.dry_run {
            self.dry_run_report(&records);
        } else {
            self.write(&records)?;
        }

        if !self.config.quiet {
            self.stats.print_summary();
        }
        Ok(())
    }

    /// Stage 1: parse the dump
    fn read_source(&mut self) -> Result<SourceData, WordlistError> {
        let input = &self.config.input;
        if !self.config.quiet {
            print_header("Reading input...");
            print_info(&format!("Input:  {:?} ({:?} format)", input, self.config.format));
        }

        self.stats.input_bytes = fs::metadata(input).map(|m| m.len()).unwrap_or(0);

        let pb = if self.config.quiet {
            indicatif::ProgressBar::hidden()
        } else {
            create_spinner(&format!("Parsing {}...", ByteSize(self.stats.input_bytes)))
        };

        let reader = SourceReader::new(self.config.format, self.config.comment_marker.as_deref())
            .with_encoding(self.config.encoding);
        let result = reader.read(input);
        pb.finish_and_clear();
        let source = result?;

        self.stats.total_lines = source.report.lines;
        self.stats.skipped_lines = source.report.skipped;
        self.stats.malformed_lines = source.report.malformed;
        self.stats.distinct_words = source.words.len() as u64;
        self.stats.distinct_bigrams = source.bigrams.len() as u64;

        if !self.config.quiet {
            print_info(&format!("Encoding: {}", source.report.encoding));
            print_info(&format!(
                "Distinct words: {}{}",
                source.words.len(),
                if source.bigrams.is_empty() {
                    String::new()
                } else {
                    format!(", word pairs: {}", source.bigrams.len())
                }
            ));
            if source.report.malformed > 0 {
                print_warning(&format!("Skipped {} malformed lines", source.report.malformed));
            }
        }

        Ok(source)
    }

    /// Stages 2-5 on an already read source
    pub fn transform(
        &mut self,
        source: SourceData,
        filter: &ExclusionFilter,
        dictionary: Option<&SpellingDictionary>,
    ) -> Result<FinalRecords, WordlistError> {
        let input = self.config.input.clone();
        let SourceData {
            mut words,
            mut bigrams,
            ..
        } = source;

        // Stage 2: exclusion, before normalization so banned words cannot skew the scale
        let excluded = filter.apply(&mut words, &mut bigrams);
        self.stats.excluded_words = excluded.total() as u64;
        if words.surviving() == 0 {
            return Err(WordlistError::fatal(&input, "every word is on an exclusion list"));
        }

        // Stage 3: spelling
        if let Some(dictionary) = dictionary {
            let (checked, checked_bigrams, report) = dictionary.apply(words, bigrams);
            self.stats.rejected_words = report.rejected as u64;
            words = checked;
            bigrams = checked_bigrams;
            if words.is_empty() {
                return Err(WordlistError::fatal(&input, "no word is in the spelling dictionary"));
            }
        } else {
            words.retain(|r| !r.excluded);
        }

        // Stage 4: normalization
        // Bigrams use their own band above most words
        let normalizer = Normalizer::new(self.config.scale, self.config.floor);
        let mut words = words.into_records();
        let mut bigrams = bigrams.into_records();
        normalizer.normalize(&mut words);
        Normalizer::new(self.config.scale, self.config.bigram_floor).normalize(&mut bigrams);
        log::debug!("Normalized {} words with {:?} scale", words.len(), normalizer.scale());

        // Stage 5: size limit
        let limited = SizeLimiter::new(self.config.limit).apply(words);
        self.stats.limited_words = limited.discarded as u64;
        if limited.discarded > 0 {
            log::info!("Limit dropped {} words", limited.discarded);
        }

        let limited_bigrams = SizeLimiter::new(Some(self.config.bigram_limit)).apply(bigrams);
        self.stats.limited_bigrams = limited_bigrams.discarded as u64;

        Ok(FinalRecords {
            words: limited.kept,
            bigrams: limited_bigrams.kept,
        })
    }

    /// Stage 6: write the combined wordlist
    fn write(&mut self, records: &FinalRecords) -> Result<(), WordlistError> {
        let output = &self.config.output;
        if !self.config.quiet {
            print_header("Writing combined wordlist...");
            print_info(&format!("Output: {:?}", output));
        }

        let header = Header::new(&self.config.lang, &self.config.description, self.config.date);
        let pb = if self.config.quiet {
            indicatif::ProgressBar::hidden()
        } else {
            create_progress_bar(records.words.len() as u64, "Writing...")
        };

        let mut writer = CombinedWriter::create(output, self.config.buffer_size)?;
        let result = writer.write_all(&header, &records.words, &records.bigrams, || pb.inc(1));
        if let Err(e) = result {
            pb.abandon_with_message("Failed".red().to_string());
            return Err(e);
        }
        let summary = writer.finish()?;
        pb.finish_with_message("Complete".green().to_string());

        self.stats.words_written = summary.words_written;
        self.stats.bigrams_written = summary.bigrams_written;

        if !self.config.quiet {
            print_success(&format!("Output written to: {:?}", output));
            print_info(&format!("Words: {}", summary.words_written));
            if summary.bigrams_written > 0 {
                print_info(&format!("Bigrams: {}", summary.bigrams_written));
            }
        }
        Ok(())
    }

    /// Dry run report
    fn dry_run_report(&self, records: &FinalRecords) {
        print_header("DRY RUN - No files will be written");

        println!("\n  {} Output configuration:", "▶".green());
        print_bullet(&format!("Output file: {:?}", self.config.output));
        print_bullet(&format!(
            "Header: {}",
            Header::new(&self.config.lang, &self.config.description, self.config.date)
        ));
        print_bullet(&format!(
            "Scale: {:?} (floor {}, bigram floor {})",
            self.config.scale, self.config.floor, self.config.bigram_floor
        ));
        match self.config.limit {
            Some(limit) => print_bullet(&format!("Limit: {} words", limit)),
            None => print_bullet("Limit: none"),
        }
        print_bullet(&format!("Words: {}", records.words.len()));
        if !records.bigrams.is_empty() {
            print_bullet(&format!("Bigrams: {}", records.bigrams.len()));
        }

        println!("\n  {} Top words:", "▶".green());
        for record in records.words.iter().take(10) {
            print_bullet(&format!("{} (f={})", record.word, record.normalized_frequency));
        }
    }

    /// Get processing statistics
    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::ExclusionList;
    use std::io::Write;
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                dir: TempDir::new().unwrap(),
            }
        }

        fn file(&self, name: &str, content: &str) -> PathBuf {
            let path = self.dir.path().join(name);
            let mut file = fs::File::create(&path).unwrap();
            file.write_all(content.as_bytes()).unwrap();
            path
        }

        fn config(&self, input: PathBuf, output: &str) -> PipelineConfig {
            PipelineConfig {
                lang: "en_US".to_string(),
                input,
                output: self.dir.path().join(output),
                description: "English (US)".to_string(),
                format: DumpFormat::Spaced,
                scale: Scale::Log,
                floor: 1,
                bigram_floor: 176,
                comment_marker: Some("#".to_string()),
                encoding: None,
                profanity: None,
                offensive: None,
                dictionary: None,
                limit: None,
                bigram_limit: 50_000,
                date: 1_700_000_000,
                buffer_size: 4096,
                dry_run: false,
                quiet: true,
                verbose: false,
            }
        }
    }

    fn run(config: PipelineConfig) -> anyhow::Result<String> {
        let output = config.output.clone();
        Pipeline::new(config).run()?;
        Ok(fs::read_to_string(output)?)
    }

    /// (word, frequency) pairs from a combined wordlist
    fn entries(content: &str) -> Vec<(String, u8)> {
        content
            .lines()
            .filter_map(|l| l.strip_prefix(" word="))
            .map(|l| {
                let (word, f) = l.split_once(",f=").unwrap();
                (word.to_string(), f.parse().unwrap())
            })
            .collect()
    }

    const ANIMALS: &str = "cat 100\ndog 50\ndamn 200\n";

    #[test]
    fn test_offensive_word_is_removed() {
        let fx = Fixture::new();
        let mut config = fx.config(fx.file("dump.txt", ANIMALS), "out.combined");
        config.offensive = Some(fx.file("offensive.txt", "damn\n"));

        let content = run(config).unwrap();
        let entries = entries(&content);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], ("cat".to_string(), 255));
        assert_eq!(entries[1].0, "dog");
        assert!(entries[1].1 < 255 && entries[1].1 >= 1);
        assert!(!content.contains("damn"));
    }

    #[test]
    fn test_limit_one_keeps_top_word() {
        let fx = Fixture::new();
        let mut config = fx.config(fx.file("dump.txt", ANIMALS), "out.combined");
        config.offensive = Some(fx.file("offensive.txt", "damn\n"));
        config.limit = Some(1);

        let content = run(config).unwrap();

        assert_eq!(entries(&content), vec![("cat".to_string(), 255)]);
    }

    #[test]
    fn test_header_is_first_line() {
        let fx = Fixture::new();
        let config = fx.config(fx.file("dump.txt", ANIMALS), "out.combined");

        let content = run(config).unwrap();

        assert_eq!(
            content.lines().next().unwrap(),
            "dictionary=main:en_us,locale=en_US,description=English (US),date=1700000000,version=1"
        );
        assert_eq!(content.lines().count(), 4);
    }

    #[test]
    fn test_output_is_deterministic() {
        let fx = Fixture::new();
        let input = fx.file("dump.txt", "a 5\nb 5\nc 9\nd 1\ne 7\nf 7\ng 3\n");
        let mut first = fx.config(input.clone(), "first.combined");
        first.limit = Some(4);
        let mut second = fx.config(input, "second.combined");
        second.limit = Some(4);

        assert_eq!(run(first).unwrap(), run(second).unwrap());
    }

    #[test]
    fn test_empty_lists_match_no_lists() {
        let fx = Fixture::new();
        let input = fx.file("dump.txt", ANIMALS);
        let plain = fx.config(input.clone(), "plain.combined");
        let mut with_lists = fx.config(input, "lists.combined");
        with_lists.profanity = Some(fx.file("profanity.txt", ""));
        with_lists.offensive = Some(fx.file("offensive.txt", "\n\n"));

        assert_eq!(run(plain).unwrap(), run(with_lists).unwrap());
    }

    #[test]
    fn test_exclusion_is_case_insensitive_and_complete() {
        let fx = Fixture::new();
        let mut config = fx.config(fx.file("dump.txt", "Damn 9\nDAMN 4\nheck 3\nfine 2\n"), "out.combined");
        config.profanity = Some(fx.file("profanity.txt", "damn\n"));
        config.offensive = Some(fx.file("offensive.txt", "HECK\n"));

        let content = run(config).unwrap();

        assert_eq!(entries(&content), vec![("fine".to_string(), 255)]);
    }

    #[test]
    fn test_all_excluded_is_fatal() {
        let fx = Fixture::new();
        let mut config = fx.config(fx.file("dump.txt", "damn 3\n"), "out.combined");
        config.profanity = Some(fx.file("profanity.txt", "damn\n"));
        let output = config.output.clone();

        let err = Pipeline::new(config).run().unwrap_err();

        let err = err.downcast_ref::<WordlistError>().unwrap();
        assert!(matches!(err, WordlistError::FatalInput { .. }));
        assert!(!output.exists());
    }

    #[test]
    fn test_only_malformed_lines_is_fatal() {
        let fx = Fixture::new();
        let config = fx.config(fx.file("dump.txt", "# comment\nnofrequency\n"), "out.combined");

        let err = Pipeline::new(config).run().unwrap_err();
        assert_eq!(err.downcast_ref::<WordlistError>().unwrap().exit_code(), 2);
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let fx = Fixture::new();
        let config = fx.config(fx.file("dump.txt", "cat 10\nbroken\ndog 5\n"), "out.combined");

        let mut pipeline = Pipeline::new(config);
        pipeline.run().unwrap();

        assert_eq!(pipeline.stats().malformed_lines, 1);
        assert_eq!(pipeline.stats().words_written, 2);
    }

    #[test]
    fn test_unwritable_output_is_reported() {
        let fx = Fixture::new();
        let mut config = fx.config(fx.file("dump.txt", ANIMALS), "out.combined");
        config.output = fx.dir.path().join("missing").join("out.combined");

        let err = Pipeline::new(config).run().unwrap_err();
        assert_eq!(err.downcast_ref::<WordlistError>().unwrap().exit_code(), 3);
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let fx = Fixture::new();
        let mut config = fx.config(fx.file("dump.txt", ANIMALS), "out.combined");
        config.dry_run = true;
        let output = config.output.clone();

        Pipeline::new(config).run().unwrap();
        assert!(!output.exists());
    }

    #[test]
    fn test_corpus_with_bigrams_and_spelling() {
        let fx = Fixture::new();
        let mut config = fx.config(
            fx.file("corpus.txt", "the cat sat in paris\nthe cat ran\nthe dog sat\n"),
            "out.combined",
        );
        config.format = DumpFormat::Corpus;
        config.dictionary = Some(fx.file("en.dic", "6\nthe\ncat/S\nsat\ndog/S\nParis\nin\n"));

        let content = run(config).unwrap();
        let lines: Vec<_> = content.lines().skip(1).collect();

        assert_eq!(lines[0], " word=the,f=255");
        assert_eq!(lines[1], "  bigram=cat,f=255");
        assert_eq!(lines[2], "  bigram=dog,f=176");
        assert!(content.contains(" word=Paris,f="));
        assert!(!content.contains("word=ran"));
        assert!(!content.contains("bigram=ran"));
    }

    #[test]
    fn test_bigrams_stay_in_their_band() {
        let fx = Fixture::new();
        let corpus = format!("{}the dog\na dog\n", "the cat\n".repeat(50));
        let mut config = fx.config(fx.file("corpus.txt", &corpus), "out.combined");
        config.format = DumpFormat::Corpus;

        let content = run(config).unwrap();
        let lines: Vec<_> = content.lines().skip(1).collect();

        assert_eq!(
            lines,
            vec![
                " word=the,f=255",
                "  bigram=cat,f=255",
                "  bigram=dog,f=176",
                " word=cat,f=254",
                " word=dog,f=46",
                " word=a,f=1",
                "  bigram=dog,f=176",
            ]
        );
    }

    #[test]
    fn test_bigram_limit_is_counted() {
        let fx = Fixture::new();
        let corpus = format!("{}the dog\na dog\n", "the cat\n".repeat(50));
        let mut config = fx.config(fx.file("corpus.txt", &corpus), "out.combined");
        config.format = DumpFormat::Corpus;
        config.bigram_limit = 1;

        let mut pipeline = Pipeline::new(config);
        pipeline.run().unwrap();

        assert_eq!(pipeline.stats().limited_bigrams, 2);
        assert_eq!(pipeline.stats().bigrams_written, 1);
    }

    #[test]
    fn test_transform_excludes_before_normalizing() {
        let fx = Fixture::new();
        let config = fx.config(PathBuf::from("dump.txt"), "unused.combined");
        let mut words = crate::record::RecordSet::new();
        words.observe("huge", 1_000_000.0);
        words.observe("cat", 100.0);
        words.observe("dog", 10.0);
        let source = SourceData {
            words,
            bigrams: Default::default(),
            report: Default::default(),
        };
        let filter = ExclusionFilter::new(ExclusionList::from_lines(["huge"]), ExclusionList::empty());

        let records = Pipeline::new(config).transform(source, &filter, None).unwrap();

        let top = &records.words[0];
        assert_eq!((top.word.as_str(), top.normalized_frequency), ("cat", 255));
        assert_eq!(records.words[1].normalized_frequency, 1);
    }
}
