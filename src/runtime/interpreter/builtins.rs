use crate::lang::code::Opcode;
use crate::runtime::data_structures::dictionary::Dictionary;
use crate::runtime::data_structures::value::Value;

/// Install every built-in word into a fresh dictionary, in the same order and at the same
/// priorities as the reference implementation's `_DICT` table. Order matters only for
/// readability here -- lookup always finds the newest entry, and nothing below shadows anything
/// else in this table -- but keeping the reference's order makes this table easy to diff against
/// `wtf.py`.
pub fn register(dictionary: &mut Dictionary) {
    let mut word = |name: &str, priority: u8, opcode: Opcode, datum: Value| {
        dictionary.insert(name.to_string(), priority, opcode, datum);
    };

    word("$PRINT", 10, Opcode::Print, Value::Nil);
    word("(", 0, Opcode::OpenPar, Value::text(")"));
    word(")", 0, Opcode::ClosePar, Value::text(")"));
    word("*", 110, Opcode::Mul, Value::Nil);
    word("**", 130, Opcode::Pow, Value::Nil);
    word("+", 100, Opcode::Add, Value::Nil);
    word("-", 100, Opcode::Sub, Value::Nil);
    word("/", 110, Opcode::Div, Value::Nil);
    word("<", 90, Opcode::Lt, Value::Nil);
    word("<=", 90, Opcode::Leq, Value::Nil);
    word("<>", 90, Opcode::Neq, Value::Nil);
    word("=", 90, Opcode::Eq, Value::Nil);
    word(">", 90, Opcode::Gt, Value::Nil);
    word(">=", 90, Opcode::Geq, Value::Nil);
    word("ABS", 200, Opcode::Abs, Value::Nil);
    word("AND", 70, Opcode::And, Value::Nil);
    word("CMD", 0, Opcode::Begin, Value::Address(0));
    word("DEF", 0, Opcode::Def, Value::Nil);
    word("DO", 0, Opcode::Do, Value::Nil);
    word("ELIF", 0, Opcode::Elif, Value::Nil);
    word("ELSE", 0, Opcode::Else, Value::Nil);
    word("END", 0, Opcode::End, Value::Nil);
    word("FCLOSE", 10, Opcode::FClose, Value::Nil);
    word("FGET", 200, Opcode::FGet, Value::Nil);
    word("FI", 0, Opcode::Fi, Value::Nil);
    word("FOPEN", 200, Opcode::FOpen, Value::Nil);
    word("FOR", 0, Opcode::For, Value::Nil);
    word("FPUT", 10, Opcode::FPut, Value::Nil);
    word("FUNC", 0, Opcode::Begin, Value::Address(250));
    word("IF", 0, Opcode::If, Value::Nil);
    word("INCLUDE", 0, Opcode::Include, Value::Nil);
    word("LEN", 200, Opcode::SLen, Value::Nil);
    word("LET", 0, Opcode::LetAssign, Value::Nil);
    word("NEG", 120, Opcode::Neg, Value::Nil);
    word("NEXT", 0, Opcode::Next, Value::Nil);
    word("NIL", 255, Opcode::Push, Value::Nil);
    word("NOT", 80, Opcode::Not, Value::Nil);
    word("OD", 0, Opcode::Od, Value::Nil);
    word("OF", 0, Opcode::OfAssign, Value::Nil);
    word("OR", 60, Opcode::Or, Value::Nil);
    word("POP", 200, Opcode::SPop, Value::Nil);
    word("PRINT", 10, Opcode::Print, Value::Nil);
    word("PROC", 0, Opcode::Begin, Value::Address(10));
    word("PUSH", 20, Opcode::SPush, Value::Nil);
    word("RAND", 255, Opcode::Rand, Value::Nil);
    word("ROUND", 200, Opcode::Round, Value::Nil);
    word("STACK", 0, Opcode::Stack, Value::Nil);
    word("THEN", 0, Opcode::Then, Value::Nil);
    word("TO", 0, Opcode::To, Value::Nil);
    word("TOS", 200, Opcode::STos, Value::Nil);
    word("WHILE", 0, Opcode::While, Value::Nil);
    word("[", 0, Opcode::OpenPar, Value::text("]"));
    word("\"", 0, Opcode::StrConst, Value::Nil);
    word("\\", 0, Opcode::Comment, Value::Nil);
    word("\n", 0, Opcode::Newline, Value::Nil);
    word("]", 0, Opcode::CloseBra, Value::text("]"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_every_operator_word() {
        let mut dictionary = Dictionary::new();
        register(&mut dictionary);

        for name in ["+", "-", "*", "/", "**", "<", "<=", "<>", "=", ">", ">="] {
            assert!(dictionary.find(name).is_some(), "missing word {}", name);
        }
    }

    #[test]
    fn dollar_print_is_a_separate_alias_for_print() {
        let mut dictionary = Dictionary::new();
        register(&mut dictionary);

        let print = dictionary.get(dictionary.find("PRINT").unwrap());
        let dollar_print = dictionary.get(dictionary.find("$PRINT").unwrap());
        assert_eq!(print.priority, dollar_print.priority);
        assert_eq!(print.opcode, dollar_print.opcode);
    }

    #[test]
    fn control_flow_words_are_all_priority_zero() {
        let mut dictionary = Dictionary::new();
        register(&mut dictionary);

        for name in ["IF", "THEN", "ELIF", "ELSE", "FI", "WHILE", "DO", "OD", "FOR", "TO", "NEXT"] {
            let index = dictionary.find(name).unwrap();
            assert_eq!(dictionary.get(index).priority, 0);
        }
    }

    #[test]
    fn def_family_words_carry_their_priority_in_the_datum() {
        let mut dictionary = Dictionary::new();
        register(&mut dictionary);

        let cmd = dictionary.get(dictionary.find("CMD").unwrap());
        assert_eq!(cmd.datum.as_index().unwrap(), 0);
        let proc = dictionary.get(dictionary.find("PROC").unwrap());
        assert_eq!(proc.datum.as_index().unwrap(), 10);
        let func = dictionary.get(dictionary.find("FUNC").unwrap());
        assert_eq!(func.datum.as_index().unwrap(), 250);
    }
}
