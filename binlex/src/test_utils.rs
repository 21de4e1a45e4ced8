//! Builders that synthesise dictionary images and DAWG files in memory,
//! so tests can round-trip the packed formats against known queries
//! without shipping the real 80 MB resources.

use std::collections::{BTreeMap, BTreeSet};

use hashbrown::HashMap;

use crate::compound::Compounder;
use crate::dictionary::{Dictionary, IMAGE_SIGNATURE};
use crate::latin;
use crate::lookup::{Bin, BinOptions};

/// One input row for the image builder, mirroring the CSV the offline
/// packer consumes. An empty `ksnid` string selects the default record.
pub(crate) struct FixtureEntry {
    pub lemma: &'static str,
    pub lemma_id: u32,
    pub word_class: &'static str,
    pub domain: &'static str,
    pub surface: &'static str,
    pub tag: &'static str,
    pub ksnid: &'static str,
}

pub(crate) const fn row(
    lemma: &'static str,
    lemma_id: u32,
    word_class: &'static str,
    domain: &'static str,
    surface: &'static str,
    tag: &'static str,
) -> FixtureEntry {
    FixtureEntry {
        lemma,
        lemma_id,
        word_class,
        domain,
        surface,
        tag,
        ksnid: "",
    }
}

const KSNID_DEFAULT: &str = "1;;;;K;1;;;";
const KSNID_COMMON_V: &str = "1;;;;V;1;;;";

// ── byte buffer with placeholder patching ───────────────────────────────

struct Buf {
    data: Vec<u8>,
}

impl Buf {
    fn new() -> Self {
        Self { data: Vec::new() }
    }

    fn pos(&self) -> usize {
        self.data.len()
    }

    fn u8(&mut self, v: u8) {
        self.data.push(v);
    }

    fn u32(&mut self, v: u32) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    fn bytes(&mut self, b: &[u8]) {
        self.data.extend_from_slice(b);
    }

    fn placeholder(&mut self) -> usize {
        let p = self.pos();
        self.u32(0);
        p
    }

    fn patch(&mut self, at: usize, v: u32) {
        self.data[at..at + 4].copy_from_slice(&v.to_le_bytes());
    }

    fn patch_here(&mut self, at: usize) {
        let pos = self.pos() as u32;
        self.patch(at, pos);
    }

    fn align4(&mut self) {
        while self.data.len() % 4 != 0 {
            self.data.push(0);
        }
    }

    /// Length byte, string bytes, padding to a 32-bit boundary.
    fn pstr(&mut self, s: &[u8]) {
        assert!(s.len() < 256);
        self.u8(s.len() as u8);
        self.bytes(s);
        self.align4();
    }
}

// ── radix trie construction and serialisation ───────────────────────────

struct TrieNode {
    fragment: Vec<u8>,
    value: Option<u32>,
    children: Vec<TrieNode>,
}

impl TrieNode {
    fn leaf(fragment: &[u8], value: u32) -> Self {
        Self {
            fragment: fragment.to_vec(),
            value: Some(value),
            children: Vec::new(),
        }
    }

    fn add(&mut self, fragment: &[u8], value: u32) {
        if fragment.is_empty() {
            if self.value.is_none() {
                self.value = Some(value);
            }
            return;
        }
        let ch = fragment[0];
        let mid = match self.children.binary_search_by_key(&ch, |c| c.fragment[0]) {
            Err(pos) => {
                self.children.insert(pos, Self::leaf(fragment, value));
                return;
            }
            Ok(mid) => mid,
        };
        let child = &mut self.children[mid];
        let common = child
            .fragment
            .iter()
            .zip(fragment)
            .take_while(|(a, b)| a == b)
            .count();
        if common == child.fragment.len() {
            child.add(&fragment[common..], value);
        } else if common == fragment.len() {
            // The fragment is a proper prefix of the child: break the
            // child in two.
            let mut tail = std::mem::replace(child, Self::leaf(fragment, value));
            tail.fragment.drain(..common);
            child.children.push(tail);
        } else {
            // The fragment and the child diverge after `common` bytes.
            let mut tail = std::mem::replace(
                child,
                Self {
                    fragment: fragment[..common].to_vec(),
                    value: None,
                    children: Vec::new(),
                },
            );
            tail.fragment.drain(..common);
            let fresh = Self::leaf(&fragment[common..], value);
            child.children = if fresh.fragment[0] < tail.fragment[0] {
                vec![fresh, tail]
            } else {
                vec![tail, fresh]
            };
        }
    }
}

const TRIE_SENTINEL: u32 = 0x007F_FFFF;

fn write_trie(buf: &mut Buf, root: &TrieNode, alphabet: &[u8], lookup_map: &[u32]) {
    let mut todo: Vec<(&TrieNode, usize)> = Vec::new();
    write_trie_node(buf, root, 0, alphabet, lookup_map, &mut todo);
    while let Some((node, parent_loc)) = todo.pop() {
        write_trie_node(buf, node, parent_loc, alphabet, lookup_map, &mut todo);
    }
}

fn write_trie_node<'a>(
    buf: &mut Buf,
    node: &'a TrieNode,
    parent_loc: usize,
    alphabet: &[u8],
    lookup_map: &[u32],
    todo: &mut Vec<(&'a TrieNode, usize)>,
) {
    let loc = buf.pos() as u32;
    let val = node
        .value
        .map_or(TRIE_SENTINEL, |v| lookup_map[v as usize]);
    assert!(val < 1 << 23);
    let childless = if node.children.is_empty() {
        0x4000_0000
    } else {
        0
    };
    if node.fragment.len() <= 1 {
        let chix = match node.fragment.first() {
            None => 0,
            Some(&b) => {
                alphabet
                    .iter()
                    .position(|&a| a == b)
                    .expect("letter missing from alphabet") as u32
                    + 1
            }
        };
        assert!(chix < 1 << 7);
        buf.u32(0x8000_0000 | childless | (chix << 23) | val);
    } else {
        buf.u32(childless | val);
    }
    if !node.children.is_empty() {
        buf.u32(node.children.len() as u32);
        for child in &node.children {
            todo.push((child, buf.pos()));
            buf.u32(0xFFFF_FFFF);
        }
    }
    if node.fragment.len() > 1 {
        buf.bytes(&node.fragment);
        buf.u8(0);
        buf.align4();
    }
    if parent_loc > 0 {
        buf.patch(parent_loc, loc);
    }
}

// ── the image packer ────────────────────────────────────────────────────

/// Packs fixture rows into a complete binary image.
pub(crate) fn build_image(rows: &[FixtureEntry]) -> Vec<u8> {
    let mut forms: Vec<Vec<u8>> = Vec::new();
    let mut form_ix: HashMap<Vec<u8>, u32> = HashMap::new();
    let mut lemmas: Vec<(Vec<u8>, u32, u32)> = Vec::new();
    let mut lemma_ix: HashMap<(Vec<u8>, u32, u32), u32> = HashMap::new();
    let mut meanings: Vec<(String, String)> = Vec::new();
    let mut meaning_ix: HashMap<(String, String), u32> = HashMap::new();
    let mut ksnid_strings: Vec<String> = vec![KSNID_DEFAULT.to_string(), KSNID_COMMON_V.to_string()];
    let mut ksnid_ix: HashMap<String, u32> = ksnid_strings
        .iter()
        .enumerate()
        .map(|(i, s)| (s.clone(), i as u32))
        .collect();
    let mut subcats: Vec<String> = Vec::new();
    let mut subcat_ix: HashMap<String, u32> = HashMap::new();
    let mut form_meanings: BTreeMap<u32, Vec<(u32, u32, u32)>> = BTreeMap::new();
    let mut lemma_forms: HashMap<u32, BTreeSet<Vec<u8>>> = HashMap::new();
    let mut alphabet_set: BTreeSet<u8> = BTreeSet::new();

    for e in rows {
        let lemma = latin::encode(e.lemma).expect("fixture lemma not Latin-1");
        let form = latin::encode(e.surface).expect("fixture form not Latin-1");
        alphabet_set.extend(form.iter().copied());
        let cix = *subcat_ix.entry(e.domain.to_string()).or_insert_with(|| {
            subcats.push(e.domain.to_string());
            subcats.len() as u32 - 1
        });
        let lkey = (lemma.clone(), e.lemma_id, cix);
        let six = *lemma_ix.entry(lkey.clone()).or_insert_with(|| {
            lemmas.push(lkey.clone());
            lemmas.len() as u32 - 1
        });
        let fix = *form_ix.entry(form.clone()).or_insert_with(|| {
            forms.push(form.clone());
            forms.len() as u32 - 1
        });
        let mkey = (e.word_class.to_string(), e.tag.to_string());
        let mix = *meaning_ix.entry(mkey.clone()).or_insert_with(|| {
            meanings.push(mkey.clone());
            meanings.len() as u32 - 1
        });
        let kstr = if e.ksnid.is_empty() {
            KSNID_DEFAULT.to_string()
        } else {
            e.ksnid.to_string()
        };
        let kix = *ksnid_ix.entry(kstr.clone()).or_insert_with(|| {
            ksnid_strings.push(kstr.clone());
            ksnid_strings.len() as u32 - 1
        });
        let run = form_meanings.entry(fix).or_default();
        if !run.contains(&(six, mix, kix)) {
            run.push((six, mix, kix));
        }
        if form != lemma {
            lemma_forms.entry(six).or_default().insert(form);
        }
    }
    let alphabet: Vec<u8> = alphabet_set.into_iter().collect();

    let mut buf = Buf::new();
    buf.bytes(IMAGE_SIGNATURE);
    let mappings_p = buf.placeholder();
    let forms_p = buf.placeholder();
    let lemmas_p = buf.placeholder();
    let templates_p = buf.placeholder();
    let meanings_p = buf.placeholder();
    let alphabet_p = buf.placeholder();
    let subcats_p = buf.placeholder();
    let ksnid_p = buf.placeholder();

    // Alphabet.
    buf.patch_here(alphabet_p);
    buf.u32(alphabet.len() as u32);
    buf.bytes(&alphabet);
    buf.align4();

    // Meaning records, then their offset array.
    let mut offsets = Vec::with_capacity(meanings.len());
    for (class, tag) in &meanings {
        let mut record = latin::encode(class).unwrap();
        record.push(b' ');
        record.extend(latin::encode(tag).unwrap());
        assert!(record.len() <= 24, "meaning record too long");
        record.resize(24, b' ');
        offsets.push(buf.pos() as u32);
        buf.bytes(&record);
    }
    buf.patch_here(meanings_p);
    for off in offsets {
        buf.u32(off);
    }

    // Ksnid strings, then their offset array.
    let mut offsets = Vec::with_capacity(ksnid_strings.len());
    for s in &ksnid_strings {
        offsets.push(buf.pos() as u32);
        buf.pstr(&latin::encode(s).unwrap());
    }
    buf.patch_here(ksnid_p);
    for off in offsets {
        buf.u32(off);
    }

    // Lemma strings.
    let mut lemma_string_offsets = Vec::with_capacity(lemmas.len());
    for (lemma, _, _) in &lemmas {
        lemma_string_offsets.push(buf.pos() as u32);
        buf.pstr(lemma);
    }

    // Packed meaning records; one run per form, in form-index order.
    buf.patch_here(mappings_p);
    let mut lookup_map = Vec::with_capacity(forms.len());
    let mut word_count: u32 = 0;
    for fix in 0..forms.len() as u32 {
        lookup_map.push(word_count);
        let run = &form_meanings[&fix];
        assert!(!run.is_empty());
        for (j, &(six, mix, kix)) in run.iter().enumerate() {
            assert!(six < 1 << 18);
            assert!(mix < 1 << 11);
            assert!(kix < 1 << 19);
            let mut w = (six << 11) | mix;
            if j + 1 == run.len() {
                w |= 0x8000_0000;
            }
            match kix {
                0 => w |= 0x4000_0000,
                1 => w |= 0x2000_0000,
                _ => {}
            }
            buf.u32(w);
            word_count += 1;
            if kix > 1 {
                buf.u32(kix);
                word_count += 1;
            }
        }
    }

    // The form trie.
    let mut root = TrieNode {
        fragment: Vec::new(),
        value: None,
        children: Vec::new(),
    };
    for (fix, form) in forms.iter().enumerate() {
        root.add(form, fix as u32);
    }
    buf.patch_here(forms_p);
    write_trie(&mut buf, &root, &alphabet, &lookup_map);

    // Lemma records; the template pool directly follows the array.
    let mut template_pool: Vec<u8> = Vec::new();
    let mut template_offsets: HashMap<Vec<u8>, u32> = HashMap::new();
    buf.patch_here(lemmas_p);
    for (six, (lemma, id, cix)) in lemmas.iter().enumerate() {
        assert!(*id < 1 << 20);
        assert!(*cix < 1 << 5);
        let mut binding = (*id << 5) | *cix;
        let mut template_rel = 0u32;
        if let Some(set) = lemma_forms.get(&(six as u32)) {
            binding |= 0x8000_0000;
            let stream = compress_set(set, lemma);
            template_rel = *template_offsets.entry(stream.clone()).or_insert_with(|| {
                let off = template_pool.len() as u32;
                template_pool.extend_from_slice(&stream);
                off
            });
        }
        buf.u32(lemma_string_offsets[six]);
        buf.u32(binding);
        buf.u32(template_rel);
        buf.u32(0);
    }
    buf.patch_here(templates_p);
    buf.bytes(&template_pool);
    buf.align4();

    // Subcategory names, then the counted offset table.
    let mut offsets = Vec::with_capacity(subcats.len());
    for name in &subcats {
        offsets.push(buf.pos() as u32);
        buf.pstr(&latin::encode(name).unwrap());
    }
    buf.patch_here(subcats_p);
    buf.u32(subcats.len() as u32);
    for off in offsets {
        buf.u32(off);
    }

    buf.data
}

/// Front-codes a sorted set of forms against the lemma as base.
fn compress_set(set: &BTreeSet<Vec<u8>>, base: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut last: &[u8] = base;
    for w in set {
        let common = last.iter().zip(w).take_while(|(a, b)| a == b).count();
        let cut = last.len() - common;
        let tail = &w[common..];
        assert!(cut < 255 && tail.len() < 255);
        out.push(cut as u8);
        out.push(tail.len() as u8);
        out.extend_from_slice(tail);
        last = w;
    }
    out.push(0xFF);
    out
}

// ── DAWG packer ─────────────────────────────────────────────────────────

/// Packs a word list into a DAWG file. The graph is a plain trie, which
/// is a valid if unshared word graph; minimisation is the offline
/// builder's concern, not the reader's.
pub(crate) fn build_dawg(words: &[&str]) -> Vec<u8> {
    #[derive(Default)]
    struct Node {
        terminal: bool,
        children: BTreeMap<u8, Node>,
    }

    fn emit(nodes: &mut Vec<u32>, children: &BTreeMap<u8, Node>) -> u32 {
        let base = nodes.len();
        nodes.resize(base + children.len(), 0);
        for (k, (&byte, child)) in children.iter().enumerate() {
            let mut w = byte as u32;
            if child.terminal {
                w |= 0x8000_0000;
            }
            if k + 1 == children.len() {
                w |= 0x4000_0000;
            }
            let child_ix = if child.children.is_empty() {
                0
            } else {
                emit(nodes, &child.children)
            };
            assert!(child_ix < 1 << 22);
            nodes[base + k] = w | (child_ix << 8);
        }
        base as u32
    }

    let mut root = Node::default();
    for word in words {
        let bytes = latin::encode(word).expect("fixture word not Latin-1");
        let mut node = &mut root;
        for &b in &bytes {
            node = node.children.entry(b).or_default();
        }
        node.terminal = true;
    }
    let mut nodes: Vec<u32> = Vec::new();
    let root_ix = if root.children.is_empty() {
        0
    } else {
        emit(&mut nodes, &root.children)
    };

    let mut out = Vec::new();
    out.extend_from_slice(b"DAWG");
    out.extend_from_slice(&1u32.to_le_bytes());
    out.extend_from_slice(&(nodes.len() as u32).to_le_bytes());
    out.extend_from_slice(&root_ix.to_le_bytes());
    for n in nodes {
        out.extend_from_slice(&n.to_le_bytes());
    }
    out
}

// ── the shared fixture ──────────────────────────────────────────────────

/// Fixture rows covering the behaviours the scenario tests exercise:
/// homographs across classes, definite and plural forms, a street name,
/// and forms reachable only through the compound analyser.
pub(crate) fn fixture_rows() -> Vec<FixtureEntry> {
    vec![
        row("fara", 433568, "so", "alm", "fara", "GM-NH"),
        row("fara", 433568, "so", "alm", "fer", "GM-FH-NT-1P-ET"),
        row("fara", 433568, "so", "alm", "fór", "GM-FH-ÞT-1P-ET"),
        row("fara", 433568, "so", "alm", "færi", "GM-VH-ÞT-1P-ET"),
        row("fara", 433568, "so", "alm", "förum", "GM-FH-NT-1P-FT"),
        row("fær", 448392, "lo", "alm", "fær", "FSB-KVK-NFET"),
        row("fær", 448392, "lo", "alm", "færi", "FVB-KK-NFET"),
        row("fær", 448392, "lo", "alm", "fært", "FSB-HK-NFET"),
        row("færi", 1198, "hk", "alm", "færi", "NFET"),
        row("færi", 1198, "hk", "alm", "færi", "ÞGFET"),
        row("heftari", 7958, "kk", "alm", "heftari", "NFET"),
        row("heftari", 7958, "kk", "alm", "heftara", "ÞFET"),
        row("heftari", 7958, "kk", "alm", "heftaranum", "ÞGFETgr"),
        row("heftari", 7958, "kk", "alm", "heftarar", "NFFT"),
        row("heftari", 7958, "kk", "alm", "heftararnir", "NFFTgr"),
        row("heftari", 7958, "kk", "alm", "heftaranna", "EFFTgr"),
        row("þýskur", 415493, "lo", "alm", "þýskur", "FSB-KK-NFET"),
        row("þýskur", 415493, "lo", "alm", "þýsk", "FSB-KVK-NFET"),
        row("kjóll", 4210, "kk", "alm", "kjóll", "NFET"),
        row("kjóll", 4210, "kk", "alm", "kjól", "ÞFET"),
        row("kjóll", 4210, "kk", "alm", "kjólar", "NFFT"),
        row("kjóll", 4210, "kk", "alm", "kjólanna", "EFFTgr"),
        row("Laugavegur", 520077, "kk", "göt", "Laugavegur", "NFET"),
        row("Laugavegur", 520077, "kk", "göt", "Laugavegi", "ÞGFET"),
        row("Laugavegur", 520077, "kk", "göt", "Laugaveginum", "ÞGFETgr"),
        row("lag", 4819, "hk", "alm", "lag", "NFET"),
        row("lag", 4819, "hk", "alm", "laga", "EFFT"),
        row("laga", 4872, "so", "alm", "laga", "GM-NH"),
        row("lagi", 4901, "kk", "alm", "lagi", "NFET"),
        row("lagi", 4901, "kk", "alm", "laga", "ÞFET"),
        row("sæll", 1000, "lo", "alm", "sæll", "FSB-KK-NFET"),
        row("sæll", 1000, "lo", "alm", "sæl", "FSB-KVK-NFET"),
        FixtureEntry {
            lemma: "Vesturgata",
            lemma_id: 521000,
            word_class: "kvk",
            domain: "göt",
            surface: "Vesturgata",
            tag: "NFET",
            ksnid: "1;;;;V;1;;;",
        },
        FixtureEntry {
            lemma: "Vesturgata",
            lemma_id: 521000,
            word_class: "kvk",
            domain: "göt",
            surface: "Vesturgötu",
            tag: "ÞGFET",
            ksnid: "4;URE;;;K;4;;;",
        },
    ]
}

pub(crate) fn fixture_image() -> Vec<u8> {
    build_image(&fixture_rows())
}

pub(crate) fn fixture_prefix_dawg() -> Vec<u8> {
    build_dawg(&["síams", "síamskattar", "heftara", "laga"])
}

pub(crate) fn fixture_suffix_dawg() -> Vec<u8> {
    build_dawg(&["kjólanna", "kjóll", "kjólar", "lagi"])
}

/// A fully assembled engine over the fixture, with default options.
pub(crate) fn fixture_bin() -> Bin {
    fixture_bin_with(BinOptions::default())
}

pub(crate) fn fixture_bin_with(options: BinOptions) -> Bin {
    let dict = Dictionary::from_bytes(fixture_image()).expect("fixture image must validate");
    let compounder = Compounder::from_bytes(fixture_prefix_dawg(), fixture_suffix_dawg())
        .expect("fixture DAWGs must validate");
    Bin::assemble(dict, Some(compounder), options)
}
