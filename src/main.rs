use bookdir::{BookModel, ReaderConfig, Result, TocTreeStyle};
use clap::Parser;

/// 📚 bookdir - 已解压EPUB目录解析工具
#[derive(Parser)]
#[command(name = "bookdir")]
#[command(about = "解析已解压EPUB目录的元数据、清单、脊柱和目录")]
#[command(version)]
struct Args {
    /// EPUB目录路径
    #[arg(help = "已解压的EPUB根目录（包含META-INF/container.xml）")]
    epub_dir: String,

    /// 详细输出模式
    #[arg(short, long, help = "输出调试日志")]
    verbose: bool,

    /// 显示元数据信息
    #[arg(short, long, help = "显示Dublin Core元数据")]
    metadata: bool,

    /// 显示清单
    #[arg(long, help = "显示清单中的所有文件")]
    manifest: bool,

    /// 按媒体类型过滤清单
    #[arg(long, value_name = "MEDIA_TYPE", help = "只显示指定媒体类型的清单项")]
    media_type: Option<String>,

    /// 显示脊柱
    #[arg(short, long, help = "显示阅读顺序")]
    spine: bool,

    /// 显示目录
    #[arg(short, long, help = "显示按playOrder排序的目录")]
    toc: bool,

    /// 显示目录树
    #[arg(long, value_enum, num_args = 0..=1, default_missing_value = "symbols", help = "以树形显示目录")]
    tree: Option<TreeStyle>,

    /// 导出完整模型
    #[arg(long, help = "以YAML格式导出完整模型")]
    dump: bool,

    /// 配置文件
    #[arg(short, long, value_name = "FILE", help = "YAML配置文件路径")]
    config: Option<String>,
}

/// 目录树显示样式
#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum TreeStyle {
    /// 树状符号
    Symbols,
    /// 缩进
    Indented,
}

impl From<TreeStyle> for TocTreeStyle {
    fn from(style: TreeStyle) -> Self {
        match style {
            TreeStyle::Symbols => TocTreeStyle::TreeSymbols,
            TreeStyle::Indented => TocTreeStyle::Indented,
        }
    }
}

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    if let Err(e) = run(&args) {
        eprintln!("❌ 错误: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => ReaderConfig::from_file(path)?,
        None => ReaderConfig::default(),
    };

    let book = BookModel::initialize_with_config(&args.epub_dir, &config)?;

    if args.dump {
        print!("{}", book.to_yaml()?);
        return Ok(());
    }

    println!("📦 OPF文件: {}", book.package_path());
    println!("📁 OPF目录: {:?}", book.package_base_dir());
    println!("🧭 NCX文件: {}", book.navigation_path());
    if let Some(title) = book.metadata("title") {
        println!("📖 书名: {}", title);
    }

    if args.metadata {
        display_metadata(&book);
    }

    if args.manifest || args.media_type.is_some() {
        display_manifest(&book, args.media_type.as_deref());
    }

    if args.spine {
        display_spine(&book);
    }

    if args.toc {
        display_toc(&book);
    }

    if let Some(style) = args.tree {
        println!("\n🌳 目录树:");
        print!("{}", book.toc_tree().with_style(style.into()));
    }

    Ok(())
}

fn display_metadata(book: &BookModel) {
    println!("\n📊 元数据:");
    for (field, values) in book.metadata_table().iter() {
        println!("  {}: {}", field, values.join("; "));
    }
}

fn display_manifest(book: &BookModel, media_type: Option<&str>) {
    let items = match media_type {
        Some(media_type) => match book.manifest_by_type(media_type) {
            Some(items) => items,
            None => {
                println!("\n📄 清单中没有媒体类型为 {} 的项", media_type);
                return;
            }
        },
        None => book.manifest().iter().collect(),
    };

    println!("\n📄 清单 ({} 项):", items.len());
    for item in items {
        println!("  {} -> {} ({})", item.id, item.href, item.media_type);
    }
}

fn display_spine(book: &BookModel) {
    println!("\n📚 阅读顺序:");
    for (i, spine_item) in book.spine().iter().enumerate() {
        let href = book
            .manifest_entry(&spine_item.idref)
            .map(|item| item.href.as_str())
            .unwrap_or("<清单中不存在>");
        let linear = if spine_item.linear { "" } else { " [非线性]" };
        println!("  {}. {} -> {}{}", i + 1, spine_item.idref, href, linear);
    }
}

fn display_toc(book: &BookModel) {
    match book.toc_title() {
        Some(title) => println!("\n🧭 目录: {}", title),
        None => println!("\n🧭 目录:"),
    }
    for entry in book.toc() {
        println!(
            "  {:>4}  {}{} ({})",
            entry.play_order,
            "  ".repeat(entry.depth.saturating_sub(1) as usize),
            entry.label,
            entry.src
        );
    }

    let skipped = book.skipped_nav_points();
    if !skipped.is_empty() {
        println!("  ⚠️  跳过了 {} 个无效的navPoint", skipped.len());
    }
}
