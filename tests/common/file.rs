use derive_new::new;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Eq, PartialEq, new)]
pub struct FileSpec {
    pub path: PathBuf,
    pub content: String,
}

pub fn write_file(file_spec: FileSpec) {
    if let Some(parent) = file_spec.path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent directory");
    }

    std::fs::write(&file_spec.path, file_spec.content).expect("Failed to write file");
}

pub fn read_file(path: &Path) -> String {
    std::fs::read_to_string(path).expect("Failed to read file")
}

/// A backport patch header followed by a small diff
pub fn patch_content(commit: &str, mainline: &str) -> String {
    use fake::Fake;
    use fake::faker::lorem::en::Sentence;
    use fake::faker::name::en::Name;

    format!(
        "From: {}\n\
         Subject: {}\n\
         Git-commit: {commit}\n\
         Patch-mainline: {mainline}\n\
         References: bsc#1012345\n\
         \n\
         ---\n\
         diff --git a/net/core/dev.c b/net/core/dev.c\n\
         --- a/net/core/dev.c\n\
         +++ b/net/core/dev.c\n\
         @@ -1 +1 @@\n\
         -old\n\
         +new\n",
        Name().fake::<String>(),
        Sentence(3..6).fake::<String>()
    )
}

/// A series file whose sorted section lists `entries`
pub fn series_content(entries: &[&str]) -> String {
    let body = entries
        .iter()
        .map(|entry| format!("\t{entry}\n"))
        .collect::<String>();

    format!(
        "\t# stable updates\n\
         \tpatches.kernel.org/4.4.1-001-stable.patch\n\
         \n\
         \t########################################################\n\
         \t# sorted patches\n\
         \t########################################################\n\
         {body}\
         \n\
         \t########################################################\n\
         \t# end of sorted patches\n\
         \t########################################################\n\
         \n\
         \tpatches.suse/unsorted-local.patch\n"
    )
}
