/// Command intents and their static command table
///
/// Every command the analyzer understands is a variant of [`Intent`]. All the
/// per-command data (arguments, flags, help text, examples) lives in exhaustive
/// matches below, so adding a variant without its table entries won't compile.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The command family a line of input maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Search,
    Info,
    Compare,
    Schema,
    Add,
    Modify,
    Delete,
    Rename,
    Interactive,
    Unknown,
}

/// A flag an intent accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagSpec {
    /// Every spelling of the flag, short form first
    pub names: &'static [&'static str],
    pub takes_value: bool,
    pub help: &'static str,
}

impl FlagSpec {
    pub fn matches(&self, name: &str) -> bool {
        self.names.iter().any(|n| *n == name)
    }

    /// The canonical (longest) spelling
    pub fn long_name(&self) -> &'static str {
        self.names
            .iter()
            .copied()
            .max_by_key(|n| n.len())
            .unwrap_or_default()
    }

    /// Usage column for help output, e.g. `-a, --attrs <value>`
    pub fn usage(&self) -> String {
        let names = self.names.join(", ");
        if self.takes_value {
            format!("{} <value>", names)
        } else {
            names
        }
    }
}

/// A positional argument an intent accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgSpec {
    pub name: &'static str,
    pub required: bool,
    pub help: &'static str,
}

// Output format flags, also used by the suggestion engine
pub const OUTPUT_FORMAT_FLAGS: &[&str] = &["--json", "--ldif", "--csv", "--tree"];

const CONNECTION_FLAGS: &[FlagSpec] = &[
    FlagSpec { names: &["-u", "--username"], takes_value: true, help: "Bind DN for authentication" },
    FlagSpec { names: &["-p", "--password"], takes_value: true, help: "Password for authentication" },
    FlagSpec { names: &["--ssl"], takes_value: false, help: "Use SSL/TLS connection" },
    FlagSpec { names: &["--port"], takes_value: true, help: "LDAP port (default: 389, or 636 with SSL)" },
    FlagSpec { names: &["-h", "--help"], takes_value: false, help: "Show help for this command" },
];

const SEARCH_FLAGS: &[FlagSpec] = &[
    FlagSpec { names: &["-a", "--attrs"], takes_value: true, help: "Attribute to fetch (repeatable)" },
    FlagSpec { names: &["--scope"], takes_value: true, help: "Search scope: base, one or sub" },
    FlagSpec { names: &["--limit"], takes_value: true, help: "Maximum number of entries to return" },
    FlagSpec { names: &["--page-size"], takes_value: true, help: "Page size for paged results" },
    FlagSpec { names: &["--json"], takes_value: false, help: "Output in JSON format" },
    FlagSpec { names: &["--ldif"], takes_value: false, help: "Output in LDIF format" },
    FlagSpec { names: &["--csv"], takes_value: false, help: "Output in CSV format" },
    FlagSpec { names: &["--tree"], takes_value: false, help: "Display results as a tree" },
    FlagSpec { names: &["--output"], takes_value: true, help: "Save results to a file" },
    FlagSpec { names: &["--theme"], takes_value: true, help: "Color theme: dark or light" },
];

const INFO_FLAGS: &[FlagSpec] = &[
    FlagSpec { names: &["--json"], takes_value: false, help: "Output in JSON format" },
];

const COMPARE_FLAGS: &[FlagSpec] = &[
    FlagSpec { names: &["-a", "--attrs"], takes_value: true, help: "Attribute to compare (repeatable)" },
];

const SCHEMA_FLAGS: &[FlagSpec] = &[
    FlagSpec { names: &["--attr"], takes_value: true, help: "Show details for a single attribute type" },
];

const ADD_FLAGS: &[FlagSpec] = &[
    FlagSpec { names: &["-c", "--class"], takes_value: true, help: "Object class for the new entry (repeatable)" },
    FlagSpec { names: &["-a", "--attr"], takes_value: true, help: "Attribute as name=value (repeatable)" },
    FlagSpec { names: &["--ldif-file"], takes_value: true, help: "LDIF file containing entry attributes" },
    FlagSpec { names: &["--json-file"], takes_value: true, help: "JSON file containing entry attributes" },
];

const MODIFY_FLAGS: &[FlagSpec] = &[
    FlagSpec { names: &["--add"], takes_value: true, help: "Add a value as name=value" },
    FlagSpec { names: &["--replace"], takes_value: true, help: "Replace an attribute as name=value" },
    FlagSpec { names: &["--delete"], takes_value: true, help: "Delete an attribute or a single value" },
    FlagSpec { names: &["--file"], takes_value: true, help: "JSON file with changes" },
];

const DELETE_FLAGS: &[FlagSpec] = &[
    FlagSpec { names: &["-r", "--recursive"], takes_value: false, help: "Delete the entry and all its children" },
];

const RENAME_FLAGS: &[FlagSpec] = &[
    FlagSpec { names: &["--delete-old-rdn"], takes_value: false, help: "Remove the old RDN value" },
    FlagSpec { names: &["--parent"], takes_value: true, help: "Move the entry under a new parent DN" },
];

const INTERACTIVE_FLAGS: &[FlagSpec] = &[
    FlagSpec { names: &["--host"], takes_value: true, help: "LDAP server hostname" },
    FlagSpec { names: &["--base"], takes_value: true, help: "Base DN for operations" },
];

const HOST: ArgSpec = ArgSpec {
    name: "host",
    required: true,
    help: "LDAP server hostname or IP address, e.g. ldap.example.com",
};

const DN: ArgSpec = ArgSpec {
    name: "dn",
    required: true,
    help: "Distinguished Name of the entry, e.g. cn=jdoe,ou=people,dc=example,dc=com",
};

impl Intent {
    /// Every recognised intent, in declaration order. `Unknown` is not a command.
    pub const ALL: [Intent; 9] = [
        Intent::Search,
        Intent::Info,
        Intent::Compare,
        Intent::Schema,
        Intent::Add,
        Intent::Modify,
        Intent::Delete,
        Intent::Rename,
        Intent::Interactive,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Intent::Search => "search",
            Intent::Info => "info",
            Intent::Compare => "compare",
            Intent::Schema => "schema",
            Intent::Add => "add",
            Intent::Modify => "modify",
            Intent::Delete => "delete",
            Intent::Rename => "rename",
            Intent::Interactive => "interactive",
            Intent::Unknown => "unknown",
        }
    }

    /// Command names in priority order
    pub fn names() -> impl Iterator<Item = &'static str> {
        Self::ALL.into_iter().map(Intent::name)
    }

    /// Exact, case-insensitive lookup of a command name
    pub fn from_name(name: &str) -> Option<Intent> {
        Self::ALL
            .iter()
            .copied()
            .find(|intent| intent.name().eq_ignore_ascii_case(name))
    }

    pub fn is_known(self) -> bool {
        self != Intent::Unknown
    }

    pub fn positionals(self) -> &'static [ArgSpec] {
        match self {
            Intent::Search => &[
                HOST,
                ArgSpec {
                    name: "base_dn",
                    required: true,
                    help: "Base DN to search from, e.g. dc=example,dc=com",
                },
                ArgSpec {
                    name: "filter",
                    required: false,
                    help: "LDAP filter in parentheses, e.g. (objectClass=person)",
                },
            ],
            Intent::Info => &[HOST],
            Intent::Compare => &[
                HOST,
                ArgSpec { name: "dn1", required: true, help: "DN of the first entry" },
                ArgSpec { name: "dn2", required: true, help: "DN of the second entry" },
            ],
            Intent::Schema => &[
                HOST,
                ArgSpec {
                    name: "object_class",
                    required: false,
                    help: "Object class to describe, e.g. inetOrgPerson",
                },
            ],
            Intent::Add | Intent::Modify | Intent::Delete => &[HOST, DN],
            Intent::Rename => &[
                HOST,
                DN,
                ArgSpec { name: "new_rdn", required: true, help: "New RDN, e.g. cn=jsmith" },
            ],
            Intent::Interactive | Intent::Unknown => &[],
        }
    }

    /// Number of positional arguments that must be present
    pub fn required_args(self) -> usize {
        self.positionals().iter().filter(|arg| arg.required).count()
    }

    /// Flags specific to this intent (connection flags excluded)
    pub fn command_flags(self) -> &'static [FlagSpec] {
        match self {
            Intent::Search => SEARCH_FLAGS,
            Intent::Info => INFO_FLAGS,
            Intent::Compare => COMPARE_FLAGS,
            Intent::Schema => SCHEMA_FLAGS,
            Intent::Add => ADD_FLAGS,
            Intent::Modify => MODIFY_FLAGS,
            Intent::Delete => DELETE_FLAGS,
            Intent::Rename => RENAME_FLAGS,
            Intent::Interactive => INTERACTIVE_FLAGS,
            Intent::Unknown => &[],
        }
    }

    /// All flags recognised for this intent
    pub fn flags(self) -> impl Iterator<Item = &'static FlagSpec> {
        let common: &'static [FlagSpec] = if self.is_known() { CONNECTION_FLAGS } else { &[] };
        self.command_flags().iter().chain(common.iter())
    }

    pub fn find_flag(self, name: &str) -> Option<&'static FlagSpec> {
        self.flags().find(|flag| flag.matches(name))
    }

    pub fn synopsis(self) -> &'static str {
        match self {
            Intent::Search => "Search the directory for entries",
            Intent::Info => "Show server information and capabilities",
            Intent::Compare => "Compare the attributes of two entries",
            Intent::Schema => "Browse object classes and attribute types",
            Intent::Add => "Add a new entry",
            Intent::Modify => "Modify the attributes of an entry",
            Intent::Delete => "Delete an entry",
            Intent::Rename => "Rename or move an entry",
            Intent::Interactive => "Start an interactive shell",
            Intent::Unknown => "Unrecognised command",
        }
    }

    pub fn syntax(self) -> &'static str {
        match self {
            Intent::Search => "search <host> <base_dn> [<filter>] [options]",
            Intent::Info => "info <host> [options]",
            Intent::Compare => "compare <host> <dn1> <dn2> [options]",
            Intent::Schema => "schema <host> [<object_class>] [options]",
            Intent::Add => "add <host> <dn> [options]",
            Intent::Modify => "modify <host> <dn> [options]",
            Intent::Delete => "delete <host> <dn> [options]",
            Intent::Rename => "rename <host> <dn> <new_rdn> [options]",
            Intent::Interactive => "interactive [options]",
            Intent::Unknown => "<command> [arguments] [options]",
        }
    }

    pub fn examples(self) -> &'static [&'static str] {
        match self {
            Intent::Search => &[
                "search ldap.example.com \"dc=example,dc=com\"",
                "search ldap.example.com \"dc=example,dc=com\" \"(objectClass=person)\" -a cn -a mail",
                "search ldap.example.com \"dc=example,dc=com\" --tree",
            ],
            Intent::Info => &[
                "info ldap.example.com",
                "info ldap.example.com -u \"cn=admin,dc=example,dc=com\"",
            ],
            Intent::Compare => &[
                "compare ldap.example.com \"uid=user1,ou=people,dc=example,dc=com\" \"uid=user2,ou=people,dc=example,dc=com\"",
                "compare ldap.example.com \"uid=user1,ou=people,dc=example,dc=com\" \"uid=user2,ou=people,dc=example,dc=com\" -a mail -a cn",
            ],
            Intent::Schema => &[
                "schema ldap.example.com",
                "schema ldap.example.com person",
                "schema ldap.example.com --attr mail",
            ],
            Intent::Add => &[
                "add ldap.example.com \"cn=newuser,ou=people,dc=example,dc=com\" --class inetOrgPerson --attr cn=newuser --attr sn=User",
                "add ldap.example.com \"cn=newgroup,ou=groups,dc=example,dc=com\" --json-file group.json",
            ],
            Intent::Modify => &[
                "modify ldap.example.com \"cn=user1,ou=people,dc=example,dc=com\" --add mail=user1@example2.com",
                "modify ldap.example.com \"cn=user1,ou=people,dc=example,dc=com\" --replace mobile=555-1234",
                "modify ldap.example.com \"cn=user1,ou=people,dc=example,dc=com\" --delete mail=user1@example.com",
            ],
            Intent::Delete => &[
                "delete ldap.example.com \"cn=user1,ou=people,dc=example,dc=com\"",
                "delete ldap.example.com \"ou=people,dc=example,dc=com\" --recursive",
            ],
            Intent::Rename => &[
                "rename ldap.example.com \"cn=user1,ou=people,dc=example,dc=com\" \"cn=user1renamed\"",
                "rename ldap.example.com \"cn=user1,ou=people,dc=example,dc=com\" \"cn=user1\" --parent \"ou=admins,dc=example,dc=com\"",
            ],
            Intent::Interactive => &[
                "interactive",
                "interactive --host ldap.example.com --base \"dc=example,dc=com\"",
            ],
            Intent::Unknown => &[],
        }
    }

    pub fn common_errors(self) -> &'static [&'static str] {
        match self {
            Intent::Search => &[
                "Missing quotes around base_dn or filter",
                "Invalid filter syntax",
                "Using special characters without escaping",
            ],
            Intent::Info => &["Authentication may be required for detailed information"],
            Intent::Compare => &["DNs must be properly quoted", "Both entries must exist"],
            Intent::Schema => &["Object class or attribute may not exist"],
            Intent::Add => &[
                "Missing required attributes for object class",
                "DN already exists",
                "Parent DN doesn't exist",
            ],
            Intent::Modify => &[
                "Attempting to modify non-existent entry",
                "Missing required attributes",
                "Deleting a value that doesn't exist",
            ],
            Intent::Delete => &[
                "Entry has children (use --recursive)",
                "Entry doesn't exist",
                "Insufficient permissions",
            ],
            Intent::Rename => &[
                "New RDN already exists",
                "Parent DN doesn't exist",
                "Missing required attributes in new RDN",
            ],
            Intent::Interactive => &[
                "Not connected to a server (use connect)",
                "No base DN set (use base)",
            ],
            Intent::Unknown => &[],
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
