//! Declarative registry of per-mode templates and per-style clauses
//!
//! Both the fallback synthesizer and the suggestion generator read from here,
//! so example texts and style prose live in exactly one place.

use serde::{Deserialize, Serialize};

use crate::spec::Mode;

/// Template data for one mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeTemplate {
    pub mode: Mode,
    /// Role the generation service is asked to play
    pub role: &'static str,
    /// Fallback sentence; `{keywords}` is replaced with the topic
    pub template: &'static str,
    /// Phrase every fallback text for this mode contains
    pub required_phrase: &'static str,
    pub examples: &'static [&'static str],
}

/// Prose and examples for one image style
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleTemplate {
    pub id: &'static str,
    pub aliases: &'static [&'static str],
    pub clause: &'static str,
    /// Typical things to exclude for this style
    pub negative_hint: &'static str,
    pub examples: &'static [&'static str],
}

static APP_CREATION: ModeTemplate = ModeTemplate {
    mode: Mode::AppCreation,
    role: "Você é um arquiteto de software e product designer experiente que escreve especificações claras de aplicativos.",
    template: "Crie um aplicativo focado em {keywords}, descrevendo as funcionalidades principais, o fluxo do usuário e uma arquitetura técnica sugerida.",
    required_phrase: "aplicativo",
    examples: &[
        "Aplicativo de tarefas com listas compartilhadas, lembretes por notificação e sincronização offline.",
        "Aplicativo de finanças pessoais que categoriza gastos automaticamente e exibe metas mensais.",
        "Aplicativo de agendamento para clínicas com confirmação por mensagem e painel administrativo.",
    ],
};

static IMAGE_GENERATION: ModeTemplate = ModeTemplate {
    mode: Mode::ImageGeneration,
    role: "Você é um diretor de arte especialista em prompts para modelos de geração de imagem.",
    template: "Gere uma imagem de {keywords}, com composição equilibrada, iluminação cuidadosa e alto nível de detalhe.",
    required_phrase: "imagem",
    examples: &[
        "Um farol no alto de um penhasco ao pôr do sol, ondas quebrando, céu alaranjado, lente grande-angular.",
        "Retrato de uma raposa na floresta nevada, luz suave da manhã, fundo desfocado.",
        "Cidade futurista vista de cima à noite, ruas iluminadas, neblina leve entre os prédios.",
    ],
};

static CONTENT_CREATION: ModeTemplate = ModeTemplate {
    mode: Mode::ContentCreation,
    role: "Você é um redator e estrategista de conteúdo que adapta a mensagem ao público e ao canal.",
    template: "Escreva um conteúdo sobre {keywords}, com introdução envolvente, desenvolvimento claro e conclusão com chamada para ação.",
    required_phrase: "conteúdo",
    examples: &[
        "Post de blog com cinco dicas práticas de produtividade para quem trabalha remotamente.",
        "Roteiro de vídeo curto apresentando um novo produto em até sessenta segundos.",
        "Newsletter semanal resumindo as novidades do setor com tom próximo do leitor.",
    ],
};

static PROBLEM_SOLVING: ModeTemplate = ModeTemplate {
    mode: Mode::ProblemSolving,
    role: "Você é um consultor analítico que decompõe problemas e propõe soluções verificáveis.",
    template: "Analise o problema relacionado a {keywords}, identifique as causas prováveis e proponha soluções passo a passo com prós e contras.",
    required_phrase: "problema",
    examples: &[
        "A taxa de cancelamento de assinaturas subiu 15% no último trimestre; quais hipóteses investigar primeiro?",
        "O tempo de resposta da API dobrou após o último deploy; como isolar a causa?",
        "A equipe perde prazos recorrentes; que mudanças de processo testar nas próximas semanas?",
    ],
};

static CODING: ModeTemplate = ModeTemplate {
    mode: Mode::Coding,
    role: "Você é um engenheiro de software sênior que escreve código limpo, testado e bem documentado.",
    template: "Escreva código para {keywords}, seguindo boas práticas, com tratamento de erros, testes e comentários essenciais.",
    required_phrase: "código",
    examples: &[
        "Função em Python que valida CPF e retorna mensagens de erro específicas.",
        "Endpoint REST em Rust que pagina resultados de uma consulta SQL.",
        "Componente React de formulário com validação de campos e estados de carregamento.",
    ],
};

static INSTRUCT: ModeTemplate = ModeTemplate {
    mode: Mode::Instruct,
    role: "Você é um instrutor que transforma tarefas complexas em etapas simples e verificáveis.",
    template: "Forneça instruções passo a passo sobre {keywords}, numeradas, objetivas e com um resultado verificável ao final.",
    required_phrase: "instruções",
    examples: &[
        "Como configurar autenticação em dois fatores em uma conta de e-mail.",
        "Como preparar um ambiente de desenvolvimento Node.js do zero.",
        "Como organizar uma planilha de orçamento doméstico mensal.",
    ],
};

static EXPLAIN: ModeTemplate = ModeTemplate {
    mode: Mode::Explain,
    role: "Você é um professor paciente que explica conceitos com clareza, exemplos e analogias.",
    template: "Explique {keywords} de forma clara, com definições, exemplos práticos e analogias quando forem úteis.",
    required_phrase: "Explique",
    examples: &[
        "Explique como funciona a fotossíntese para um estudante do ensino fundamental.",
        "Explique a diferença entre juros simples e compostos com um exemplo numérico.",
        "Explique o que é uma API usando a analogia de um garçom em um restaurante.",
    ],
};

static STYLES: &[StyleTemplate] = &[
    StyleTemplate {
        id: "photorealistic",
        aliases: &["fotorrealista", "realista", "realistic", "photo"],
        clause: "em estilo fotorrealista, com texturas naturais, profundidade de campo e iluminação de estúdio",
        negative_hint: "desenho, cartoon, pele plástica, distorções anatômicas",
        examples: &[
            "Retrato fotorrealista de um pescador idoso, luz lateral dourada, lente 85mm, f/1.8.",
            "Xícara de café fumegante sobre mesa de madeira, luz da janela, macro fotografia.",
        ],
    },
    StyleTemplate {
        id: "anime",
        aliases: &["manga", "mangá"],
        clause: "em estilo anime, com traços limpos, cores vibrantes e expressões marcantes",
        negative_hint: "fotorrealismo, proporções deformadas, texto na imagem",
        examples: &[
            "Garota de cabelo azul em uma estação de trem sob chuva, estilo anime, reflexos nas poças.",
            "Samurai jovem em campo de cerejeiras ao entardecer, estilo anime cinematográfico.",
        ],
    },
    StyleTemplate {
        id: "oil_painting",
        aliases: &["pintura a oleo", "pintura a óleo", "oil"],
        clause: "como uma pintura a óleo, com pinceladas visíveis, textura de tela e paleta rica",
        negative_hint: "aspecto digital, contornos duros, fotografia",
        examples: &[
            "Paisagem rural ao amanhecer pintada a óleo, no estilo impressionista, névoa sobre o rio.",
            "Natureza-morta com frutas e jarro de cerâmica, pintura a óleo barroca, fundo escuro.",
        ],
    },
    StyleTemplate {
        id: "watercolor",
        aliases: &["aquarela"],
        clause: "em aquarela, com transições suaves, manchas translúcidas e bordas orgânicas",
        negative_hint: "contornos pretos grossos, aspecto 3D, saturação excessiva",
        examples: &[
            "Vila litorânea em aquarela com barcos coloridos e céu em tons pastel.",
            "Ilustração botânica em aquarela de uma orquídea com anotações à mão.",
        ],
    },
    StyleTemplate {
        id: "digital_art",
        aliases: &["arte digital", "digital"],
        clause: "como arte digital detalhada, com iluminação dramática e acabamento polido",
        negative_hint: "baixa resolução, artefatos de compressão, marca d'água",
        examples: &[
            "Dragão de cristal sobrevoando montanhas flutuantes, arte digital, luz volumétrica.",
            "Biblioteca mágica infinita com escadas em espiral, arte digital em tons de âmbar.",
        ],
    },
    StyleTemplate {
        id: "cyberpunk",
        aliases: &["cyber", "neon"],
        clause: "em estética cyberpunk, com luzes neon, chuva e contraste entre tecnologia e decadência urbana",
        negative_hint: "cores pastel, ambiente rural, luz diurna",
        examples: &[
            "Beco de Tóquio futurista à noite, letreiros neon, chuva fina, estética cyberpunk.",
            "Hacker com implantes luminosos em um quarto cheio de monitores, paleta magenta e ciano.",
        ],
    },
    StyleTemplate {
        id: "minimalist",
        aliases: &["minimalista", "minimal"],
        clause: "em estilo minimalista, com poucos elementos, muito espaço negativo e paleta reduzida",
        negative_hint: "excesso de detalhes, texturas ruidosas, muitos objetos",
        examples: &[
            "Uma única árvore em colina branca, céu cinza-claro, composição minimalista.",
            "Logo minimalista de uma folha formada por duas linhas curvas em verde-escuro.",
        ],
    },
    StyleTemplate {
        id: "3d_render",
        aliases: &["3d", "render", "render 3d"],
        clause: "como render 3D, com materiais realistas, iluminação global e sombras suaves",
        negative_hint: "traços 2D, ruído de render, geometria quebrada",
        examples: &[
            "Render 3D de um robô doméstico fofo em uma cozinha moderna, iluminação suave.",
            "Render 3D isométrico de um pequeno escritório com plantas e móveis de madeira.",
        ],
    },
];

/// Template data for a mode
pub fn mode_template(mode: Mode) -> &'static ModeTemplate {
    match mode {
        Mode::AppCreation => &APP_CREATION,
        Mode::ImageGeneration => &IMAGE_GENERATION,
        Mode::ContentCreation => &CONTENT_CREATION,
        Mode::ProblemSolving => &PROBLEM_SOLVING,
        Mode::Coding => &CODING,
        Mode::Instruct => &INSTRUCT,
        Mode::Explain => &EXPLAIN,
    }
}

/// Look up a style by id or alias, case-insensitively
pub fn style_template(style: &str) -> Option<&'static StyleTemplate> {
    let key = style.trim().to_lowercase().replace(['-', ' '], "_");
    let spaced = key.replace('_', " ");
    STYLES.iter().find(|s| {
        s.id == key || s.aliases.iter().any(|a| *a == key || *a == spaced)
    })
}

/// All registered style ids
pub fn style_ids() -> Vec<&'static str> {
    STYLES.iter().map(|s| s.id).collect()
}

/// Merged view of the mode template and, in image mode, the style entry
#[derive(Debug, Clone)]
pub struct ResolvedTemplate {
    pub mode: &'static ModeTemplate,
    pub style: Option<&'static StyleTemplate>,
}

impl ResolvedTemplate {
    /// Example bank: the style's when a style matched, else the mode's
    pub fn examples(&self) -> &'static [&'static str] {
        match self.style {
            Some(style) => style.examples,
            None => self.mode.examples,
        }
    }

    /// Mode sentence with the topic filled in
    pub fn render(&self, keywords: &str) -> String {
        self.mode.template.replace("{keywords}", keywords)
    }
}

/// Resolve the templates for a mode and optional style. Never fails: unknown
/// styles and non-image modes resolve to the mode entry alone.
pub fn resolve(mode: Mode, style: Option<&str>) -> ResolvedTemplate {
    let style = if mode.is_image() {
        style.and_then(style_template)
    } else {
        None
    };
    ResolvedTemplate {
        mode: mode_template(mode),
        style,
    }
}

/// Picks one entry from an example bank without an ambient random source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExampleSelector {
    /// Entry at `n` modulo the bank length
    Index(usize),
    /// Entry derived from a seed
    Seed(u64),
}

impl Default for ExampleSelector {
    fn default() -> Self {
        ExampleSelector::Index(0)
    }
}

impl ExampleSelector {
    pub fn select<'a>(&self, bank: &[&'a str]) -> Option<&'a str> {
        if bank.is_empty() {
            return None;
        }
        let index = match *self {
            ExampleSelector::Index(n) => n % bank.len(),
            ExampleSelector::Seed(seed) => (splitmix64(seed) % bank.len() as u64) as usize,
        };
        bank.get(index).copied()
    }
}

fn splitmix64(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
